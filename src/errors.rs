#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
	#[error("invalid activity: {0}")]
	BadActivity(String),

	#[error("expected {expected}, got {got}")]
	UnexpectedType { expected: &'static str, got: String },

	#[error("document is not an activity")]
	NotAnActivity,

	#[error("activity was not sent from this outbox")]
	NotFromOutbox,

	#[error("remote document is gone")]
	Gone,

	#[error("remote document not found")]
	NotFound,

	#[error("remote server unavailable")]
	Unavailable,

	#[error("collection nesting too deep")]
	RecursionLimitExceeded,

	#[error("refusing to fetch url: {0}")]
	InvalidUrl(String),

	#[error("no backend installed")]
	UninitializedBackend,

	#[error("key has no private material")]
	MissingKeyMaterial,

	#[error("openssl error: {0}")]
	OpenSSL(#[from] openssl::error::ErrorStack),

	#[error("invalid utf8: {0}")]
	Utf8(#[from] std::str::Utf8Error),

	#[error("invalid base64: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),

	#[error("signature error: {0}")]
	Signature(#[from] httpsig::SignatureError),
}

impl ProcessError {
	pub fn bad_activity(msg: impl ToString) -> Self {
		ProcessError::BadActivity(msg.to_string())
	}

	pub fn unexpected(expected: &'static str, got: impl ToString) -> Self {
		ProcessError::UnexpectedType { expected, got: got.to_string() }
	}

	/// http status a server embedding this library would most likely answer with
	pub fn status_hint(&self) -> u16 {
		match self {
			Self::NotFound => 404,
			Self::Gone => 410,
			Self::Unavailable => 503,
			Self::BadActivity(_)
				| Self::UnexpectedType { .. }
				| Self::NotAnActivity
				| Self::NotFromOutbox
				| Self::RecursionLimitExceeded
				| Self::InvalidUrl(_) => 400,
			_ => 500,
		}
	}

	/// failures that mean one remote participant is broken, not us: delivery
	/// and recipient resolution skip these instead of aborting
	pub fn is_remote_miss(&self) -> bool {
		matches!(self, Self::Gone | Self::NotFound | Self::Unavailable | Self::NotAnActivity)
	}
}

pub type Result<T> = std::result::Result<T, ProcessError>;
