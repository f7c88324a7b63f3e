//! Rebuilds the parent/child execution tree of one session from its flat element list.
//!
//! Elements are held in one arena and linked by index; the owned tree is assembled bottom-up at
//! the end, so neither building nor sorting recurses on tree depth.

use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
};

use time::PrimitiveDateTime;

use crate::{element::Element, timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeIssue {
	/// Two elements share an id that other elements reference as their parent. The first one
	/// received the children.
	DuplicateElement { element_id: String },
	/// Parent references form a loop. Every member was promoted to a root.
	Cycle { element_ids: Vec<String> },
}

#[derive(Debug, Default)]
pub struct Forest {
	pub roots: Vec<Element>,
	pub issues: Vec<TreeIssue>,
}
impl Forest {
	pub fn len(&self) -> usize {
		self.roots.iter().map(Element::subtree_len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
	Unvisited,
	OnPath,
	Done,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct StartKey<'a> {
	unparsed: bool,
	started: Option<PrimitiveDateTime>,
	raw: &'a str,
	element_id: &'a str,
	position: usize,
}

/// Links every element to its declared parent and orders siblings by start time.
///
/// Elements whose parent is absent from the input stay in the forest as roots. Parent references
/// are expected to be acyclic; a loop is broken by promoting its members to roots.
pub fn rebuild(elements: Vec<Element>) -> Forest {
	let mut issues = Vec::new();
	let parents = resolve_parents(&elements, &mut issues);
	let parents = break_cycles(&elements, parents, &mut issues);
	let mut children: Vec<Vec<usize>> = vec![Vec::new(); elements.len()];
	let mut roots = Vec::new();

	for (index, parent) in parents.iter().enumerate() {
		match parent {
			Some(parent) => children[*parent].push(index),
			None => roots.push(index),
		}
	}

	{
		let keys: Vec<StartKey<'_>> = elements
			.iter()
			.enumerate()
			.map(|(position, element)| {
				let raw = element.started.as_deref().unwrap_or_default();
				let started = timestamp::parse(raw);

				StartKey {
					unparsed: started.is_none(),
					started,
					raw,
					element_id: element.element_id.as_str(),
					position,
				}
			})
			.collect();
		let by_start = |a: &usize, b: &usize| -> Ordering { keys[*a].cmp(&keys[*b]) };

		roots.sort_by(by_start);

		for siblings in &mut children {
			siblings.sort_by(by_start);
		}
	}

	let roots = assemble(elements, &roots, &mut children);

	Forest { roots, issues }
}

fn resolve_parents(elements: &[Element], issues: &mut Vec<TreeIssue>) -> Vec<Option<usize>> {
	let referenced: HashSet<&str> = elements
		.iter()
		.filter_map(|element| element.parent_element.as_deref())
		.filter(|parent| !parent.is_empty())
		.collect();
	let mut by_id: HashMap<&str, usize> = HashMap::new();

	for (index, element) in elements.iter().enumerate() {
		let element_id = element.element_id.as_str();

		if !referenced.contains(element_id) {
			continue;
		}
		if by_id.contains_key(element_id) {
			tracing::warn!(
				element_id,
				session_id = element.session_id.as_deref().unwrap_or_default(),
				"Duplicated session element. Session data is inconsistent."
			);
			issues.push(TreeIssue::DuplicateElement { element_id: element_id.to_string() });

			continue;
		}

		by_id.insert(element_id, index);
	}

	elements
		.iter()
		.map(|element| {
			element.parent_element.as_deref().and_then(|parent| by_id.get(parent).copied())
		})
		.collect()
}

fn break_cycles(
	elements: &[Element],
	mut parents: Vec<Option<usize>>,
	issues: &mut Vec<TreeIssue>,
) -> Vec<Option<usize>> {
	let mut state = vec![Visit::Unvisited; elements.len()];

	for start in 0..elements.len() {
		if state[start] != Visit::Unvisited {
			continue;
		}

		let mut path = Vec::new();
		let mut cursor = Some(start);

		while let Some(node) = cursor {
			match state[node] {
				Visit::Unvisited => {
					state[node] = Visit::OnPath;
					path.push(node);
					cursor = parents[node];
				},
				Visit::OnPath => {
					if let Some(entry) = path.iter().position(|candidate| *candidate == node) {
						let members = &path[entry..];
						let element_ids: Vec<String> = members
							.iter()
							.map(|member| elements[*member].element_id.clone())
							.collect();

						tracing::warn!(
							element_ids = ?element_ids,
							"Session element parent references form a cycle. Members are shown as roots."
						);

						for member in members {
							parents[*member] = None;
						}

						issues.push(TreeIssue::Cycle { element_ids });
					}

					break;
				},
				Visit::Done => break,
			}
		}

		for node in path {
			state[node] = Visit::Done;
		}
	}

	parents
}

fn assemble(elements: Vec<Element>, roots: &[usize], children: &mut [Vec<usize>]) -> Vec<Element> {
	let mut preorder = Vec::with_capacity(elements.len());
	let mut stack: Vec<usize> = roots.iter().rev().copied().collect();

	while let Some(node) = stack.pop() {
		preorder.push(node);
		stack.extend(children[node].iter().rev().copied());
	}

	let mut pending: Vec<Option<Element>> = elements.into_iter().map(Some).collect();
	let mut built: Vec<Option<Element>> = vec![None; pending.len()];

	for node in preorder.into_iter().rev() {
		let Some(mut element) = pending[node].take() else {
			continue;
		};

		element.children = std::mem::take(&mut children[node])
			.into_iter()
			.filter_map(|child| built[child].take())
			.collect();
		built[node] = Some(element);
	}

	roots.iter().filter_map(|root| built[*root].take()).collect()
}
