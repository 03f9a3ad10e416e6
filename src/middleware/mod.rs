/*
 * Responsibility
 * - auth: session cookie carrier + per-route gate
 * - http / security_headers: router-wide layers applied in app.rs
 */
pub mod auth;
pub mod http;
pub mod security_headers;
