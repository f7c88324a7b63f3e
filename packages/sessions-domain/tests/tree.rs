use sessions_domain::{
	Element, ElementRecord, TreeIssue, aggregate, flatten,
	tree::{self, Forest},
};

fn element(id: &str, parent: Option<&str>, started: &str) -> Element {
	Element {
		element_id: id.to_string(),
		session_id: Some("s-1".to_string()),
		parent_element: parent.map(str::to_string),
		started: Some(started.to_string()),
		..Default::default()
	}
}

fn ids(elements: &[Element]) -> Vec<&str> {
	elements.iter().map(|element| element.element_id.as_str()).collect()
}

fn assert_sorted(forest: &Forest) {
	let mut stack: Vec<&[Element]> = vec![forest.roots.as_slice()];

	while let Some(siblings) = stack.pop() {
		for pair in siblings.windows(2) {
			assert!(
				pair[0].started <= pair[1].started,
				"Siblings out of order: {:?} then {:?}",
				pair[0].element_id,
				pair[1].element_id
			);
		}
		for node in siblings {
			stack.push(node.children.as_slice());
		}
	}
}

#[test]
fn empty_input_yields_empty_forest() {
	let forest = tree::rebuild(Vec::new());

	assert!(forest.is_empty());
	assert!(forest.issues.is_empty());
}

#[test]
fn single_element_is_a_childless_root() {
	let forest = tree::rebuild(vec![element("a", None, "2024-01-01T00:00:00")]);

	assert_eq!(ids(&forest.roots), vec!["a"]);
	assert!(forest.roots[0].children.is_empty());
}

#[test]
fn nested_tree_keeps_every_node_and_orders_children_by_start() {
	let input = vec![
		element("c2", Some("b"), "2024-01-01T00:00:05"),
		element("b", Some("a"), "2024-01-01T00:00:02"),
		element("a", None, "2024-01-01T00:00:00"),
		element("c1", Some("b"), "2024-01-01T00:00:03"),
		element("b2", Some("a"), "2024-01-01T00:00:01"),
		element("z", None, "2023-12-31T23:59:59"),
	];
	let forest = tree::rebuild(input);

	assert_eq!(forest.len(), 6);
	assert_eq!(ids(&forest.roots), vec!["z", "a"]);

	let a = &forest.roots[1];

	assert_eq!(ids(&a.children), vec!["b2", "b"]);
	assert_eq!(ids(&a.children[1].children), vec!["c1", "c2"]);
	assert_sorted(&forest);
}

#[test]
fn equal_start_times_are_ordered_deterministically() {
	let first = tree::rebuild(vec![
		element("root", None, "2024-01-01T00:00:00"),
		element("y", Some("root"), "2024-01-01T00:00:01"),
		element("x", Some("root"), "2024-01-01T00:00:01"),
	]);
	let second = tree::rebuild(vec![
		element("x", Some("root"), "2024-01-01T00:00:01"),
		element("root", None, "2024-01-01T00:00:00"),
		element("y", Some("root"), "2024-01-01T00:00:01"),
	]);

	assert_eq!(ids(&first.roots[0].children), vec!["x", "y"]);
	assert_eq!(ids(&second.roots[0].children), vec!["x", "y"]);
}

#[test]
fn orphan_is_kept_as_root() {
	let forest = tree::rebuild(vec![
		element("a", None, "2024-01-01T00:00:00"),
		element("e", Some("filtered-out"), "2024-01-01T00:00:01"),
	]);

	assert_eq!(ids(&forest.roots), vec!["a", "e"]);
	assert_eq!(forest.len(), 2);
	assert!(forest.issues.is_empty());
}

#[test]
fn duplicate_parent_id_keeps_first_and_reports() {
	let mut first = element("p", None, "2024-01-01T00:00:00");

	first.element_name = Some("first".to_string());

	let mut second = element("p", None, "2024-01-01T00:00:01");

	second.element_name = Some("second".to_string());

	let forest =
		tree::rebuild(vec![first, second, element("child", Some("p"), "2024-01-01T00:00:02")]);

	assert_eq!(forest.issues, vec![TreeIssue::DuplicateElement { element_id: "p".to_string() }]);
	assert_eq!(forest.len(), 3);
	assert_eq!(forest.roots[0].element_name.as_deref(), Some("first"));
	assert_eq!(ids(&forest.roots[0].children), vec!["child"]);
	assert!(forest.roots[1].children.is_empty());
}

#[test]
fn cycle_members_become_roots() {
	let forest = tree::rebuild(vec![
		element("a", Some("b"), "2024-01-01T00:00:00"),
		element("b", Some("a"), "2024-01-01T00:00:01"),
		element("c", Some("a"), "2024-01-01T00:00:02"),
		element("self", Some("self"), "2024-01-01T00:00:03"),
	]);

	assert_eq!(forest.len(), 4);
	assert_eq!(ids(&forest.roots), vec!["a", "b", "self"]);
	assert_eq!(ids(&forest.roots[0].children), vec!["c"]);
	assert_eq!(forest.issues.len(), 2);
	assert!(forest.issues.iter().all(|issue| matches!(issue, TreeIssue::Cycle { .. })));
}

#[test]
fn deep_chain_is_rebuilt_without_recursion() {
	let depth = 20_000;
	let mut input = Vec::with_capacity(depth);

	for level in 0..depth {
		let parent = if level == 0 { None } else { Some(format!("n{}", level - 1)) };

		input.push(Element {
			element_id: format!("n{level}"),
			parent_element: parent,
			started: Some("2024-01-01T00:00:00".to_string()),
			..Default::default()
		});
	}

	let forest = tree::rebuild(input);

	assert_eq!(forest.roots.len(), 1);
	assert_eq!(forest.len(), depth);

	// Unlink iteratively so the drop does not recurse either.
	let mut roots = forest.roots;

	while let Some(mut node) = roots.pop() {
		roots.append(&mut node.children);
	}
}

#[test]
fn session_view_comes_from_first_record() {
	let records = vec![
		ElementRecord {
			id: "a".to_string(),
			session_id: "s-1".to_string(),
			external_session_id: Some("ext-1".to_string()),
			session_started: Some("2024-01-01T00:00:00".to_string()),
			session_duration: 42,
			chain_id: Some("c-1".to_string()),
			started: Some("2024-01-01T00:00:00".to_string()),
			..Default::default()
		},
		ElementRecord {
			id: "b".to_string(),
			session_id: "s-1".to_string(),
			parent_element_id: Some("a".to_string()),
			started: Some("2024-01-01T00:00:01".to_string()),
			..Default::default()
		},
	];
	let preview = aggregate::to_session(records.clone(), false).expect("session");

	assert_eq!(preview.id, "s-1");
	assert_eq!(preview.external_session_cip_id.as_deref(), Some("ext-1"));
	assert_eq!(preview.duration, 42);
	assert!(preview.session_elements.is_none());

	let full = aggregate::to_session(records.clone(), true).expect("session");
	let roots = full.session_elements.expect("elements");

	assert_eq!(ids(&roots), vec!["a"]);
	assert_eq!(ids(&roots[0].children), vec!["b"]);
	assert!(aggregate::to_session(Vec::new(), true).is_none());
	assert_eq!(flatten::records_to_forest(records).len(), 2);
}
