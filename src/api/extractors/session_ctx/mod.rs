/*!
 * Session context extractor
 *
 * Responsibility:
 * - Hand the gate-resolved session (SessionCtx) to handlers
 * - axum-facing code lives in core, the type in types
 *
 * Public API:
 * - SessionCtx
 * - SessionCtxExtractor
 * - MaybeSessionCtx
 */

mod core;
mod types;

pub use self::core::{MaybeSessionCtx, SessionCtxExtractor};
pub use self::types::SessionCtx;
