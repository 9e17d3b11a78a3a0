// technically not part of ActivityStreams, but every federating actor carries one

use crate::{getter, setter, Base, BaseMut};

pub trait PublicKey: Base {
	fn owner(&self) -> Option<&str> { None }
	fn public_key_pem(&self) -> Option<&str> { None }
}

pub trait PublicKeyMut: BaseMut {
	fn set_owner(self, val: Option<&str>) -> Self;
	fn set_public_key_pem(self, val: Option<&str>) -> Self;
}

impl PublicKey for serde_json::Value {
	getter! { owner -> &str }
	getter! { public_key_pem::publicKeyPem -> &str }
}

impl PublicKeyMut for serde_json::Value {
	setter! { owner -> &str }
	setter! { public_key_pem::publicKeyPem -> &str }
}
