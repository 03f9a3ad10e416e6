mod session_ctx;

pub use session_ctx::{MaybeSessionCtx, SessionCtx, SessionCtxExtractor};
