/*
 * Responsibility
 * - GET /health (liveness)
 * - Never guarded: must answer without touching session crypto
 */
pub async fn health() -> &'static str {
    "ok"
}
