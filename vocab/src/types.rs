use crate::strenum;

strenum! {
	pub enum ActorType {
		Application,
		Group,
		Organization,
		Person,
		Service;
	};

	pub enum ObjectType {
		Article,
		Audio,
		Document,
		Note,
		Page,
		Question,
		Video;
	};

	pub enum CollectionType {
		Collection,
		CollectionPage,
		OrderedCollection,
		OrderedCollectionPage;
	};

	pub enum VerbType {
		Accept,
		Announce,
		Block,
		Create,
		Delete,
		Follow,
		Like,
		Reject,
		Undo,
		Update;
	};

	pub enum ActivityType {
		Image,
		Key,
		Mention,
		Tombstone;
		Actor(ActorType),
		Object(ObjectType),
		Collection(CollectionType),
		Verb(VerbType)
	};
}

impl ActivityType {
	/// an entity capable of owning an inbox/outbox pair
	pub fn is_actor(&self) -> bool {
		matches!(self, Self::Actor(_))
	}

	/// a content object which can be wrapped in a Create
	pub fn is_creatable(&self) -> bool {
		matches!(self, Self::Object(_))
	}

	pub fn is_collection(&self) -> bool {
		matches!(self, Self::Collection(_))
	}

	pub fn is_collection_page(&self) -> bool {
		matches!(
			self,
			Self::Collection(CollectionType::CollectionPage | CollectionType::OrderedCollectionPage)
		)
	}

	pub fn is_verb(&self) -> bool {
		matches!(self, Self::Verb(_))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn every_variant_parses_back_from_its_canonical_string() {
		for t in [
			ActivityType::Verb(VerbType::Create),
			ActivityType::Verb(VerbType::Undo),
			ActivityType::Actor(ActorType::Person),
			ActivityType::Object(ObjectType::Note),
			ActivityType::Collection(CollectionType::OrderedCollectionPage),
			ActivityType::Tombstone,
		] {
			assert_eq!(ActivityType::try_from(t.as_ref()).unwrap(), t);
		}
	}

	#[test]
	fn unknown_type_strings_fail_to_parse() {
		assert!(ActivityType::try_from("SuperCoolActivity").is_err());
		assert!(ActivityType::try_from("").is_err());
		assert!(ActivityType::try_from("note").is_err()); // case sensitive
	}

	#[test]
	fn type_families_partition_the_enum() {
		assert!(ActivityType::Actor(ActorType::Group).is_actor());
		assert!(ActivityType::Object(ObjectType::Question).is_creatable());
		assert!(ActivityType::Collection(CollectionType::Collection).is_collection());
		assert!(!ActivityType::Collection(CollectionType::Collection).is_collection_page());
		assert!(ActivityType::Verb(VerbType::Block).is_verb());
		assert!(!ActivityType::Tombstone.is_verb());
	}
}
