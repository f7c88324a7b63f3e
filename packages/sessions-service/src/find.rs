use crate::{Error, Result, SessionService, query};
use sessions_domain::{Element, ElementRecord, Session, aggregate, element::field, flatten};

impl SessionService {
	/// Full session by id. A light read drops the payload fields of every element.
	pub async fn find_by_id(
		&self,
		session_id: &str,
		light: bool,
		include_elements: bool,
	) -> Result<Session> {
		self.load_session(field::SESSION_ID, session_id, light, include_elements)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("Can't find session {session_id}") })
	}

	/// Session by the id given by the caller at execution time. Details are the full element tree
	/// with payloads; otherwise only the session view is returned.
	pub async fn find_by_external_id(
		&self,
		external_id: &str,
		include_details: bool,
	) -> Result<Session> {
		self.load_session(field::EXTERNAL_SESSION_ID, external_id, !include_details, include_details)
			.await?
			.ok_or_else(|| Error::NotFound {
				message: format!("Can't find session by external id {external_id}"),
			})
	}

	pub async fn session_exists(&self, session_id: &str) -> Result<bool> {
		let request = query::window_search(self.index(), field::SESSION_ID, session_id, true, 0);
		let response = self.store.search(&request).await.map_err(Error::search)?;

		Ok(!query::inner_hit_records(response)?.is_empty())
	}

	/// Single element with its payload and no children.
	pub async fn get_element(&self, element_id: &str) -> Result<Element> {
		let response = self
			.store
			.search(&query::element_search(self.index(), element_id))
			.await
			.map_err(Error::search)?;

		query::inner_hit_records(response)?
			.into_iter()
			.next()
			.map(flatten::record_to_element)
			.ok_or_else(|| Error::NotFound {
				message: format!("Can't find element with id {element_id}"),
			})
	}

	pub(crate) async fn load_session(
		&self,
		id_field: &str,
		id: &str,
		light: bool,
		include_elements: bool,
	) -> Result<Option<Session>> {
		let records = self.fetch_records(id_field, id, light).await?;

		Ok(aggregate::to_session(records, include_elements))
	}

	/// Pages through every matching record until the store returns an empty window.
	async fn fetch_records(
		&self,
		id_field: &str,
		id: &str,
		light: bool,
	) -> Result<Vec<ElementRecord>> {
		let mut records = Vec::new();
		let mut page = 0;

		loop {
			let request = query::window_search(self.index(), id_field, id, light, page);
			let response = self.store.search(&request).await.map_err(Error::search)?;
			let window = query::inner_hit_records(response)?;

			if window.is_empty() {
				break;
			}

			records.extend(window);

			page += 1;
		}

		tracing::debug!(id_field, id, records = records.len(), "Fetched session records.");

		Ok(records)
	}
}
