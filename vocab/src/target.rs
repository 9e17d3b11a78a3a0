use crate::Object;

/// the special-cased marker for publicly addressed activities
pub const PUBLIC: &str = "https://www.w3.org/ns/activitystreams#Public";

pub trait Addressed {
	/// every delivery target declared by this document, in field order
	fn addressed(&self) -> Vec<String>;
	/// primary targets only (to + bto)
	fn mentioning(&self) -> Vec<String>;
}

impl<T: Object> Addressed for T {
	fn addressed(&self) -> Vec<String> {
		let mut to: Vec<String> = self.to().all_ids();
		to.append(&mut self.bto().all_ids());
		to.append(&mut self.cc().all_ids());
		to.append(&mut self.bcc().all_ids());
		to
	}

	fn mentioning(&self) -> Vec<String> {
		let mut to: Vec<String> = self.to().all_ids();
		to.append(&mut self.bto().all_ids());
		to
	}
}

#[cfg(test)]
mod test {
	use super::Addressed;

	#[test]
	fn addressed_finds_all_targets_on_json_documents() {
		let obj = serde_json::json!({
			"id": "http://localhost:8080/obj/1",
			"type": "Note",
			"content": "hello world!",
			"to": ["http://localhost:8080/usr/root/followers"],
			"bto": ["http://localhost:8080/usr/secret"],
			"cc": [crate::target::PUBLIC],
			"bcc": [],
		});

		assert_eq!(
			obj.addressed(),
			vec![
				"http://localhost:8080/usr/root/followers".to_string(),
				"http://localhost:8080/usr/secret".to_string(),
				crate::target::PUBLIC.to_string(),
			]
		);
	}

	#[test]
	fn mentioning_only_finds_primary_targets() {
		let obj = serde_json::json!({
			"id": "http://localhost:8080/obj/1",
			"type": "Note",
			"to": ["http://localhost:8080/usr/root/followers"],
			"bto": ["http://localhost:8080/usr/secret"],
			"cc": [crate::target::PUBLIC],
		});

		assert_eq!(
			obj.mentioning(),
			vec![
				"http://localhost:8080/usr/root/followers".to_string(),
				"http://localhost:8080/usr/secret".to_string(),
			]
		);
	}
}
