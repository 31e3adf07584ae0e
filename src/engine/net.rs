use std::net::ToSocketAddrs;

pub const RESOLVE_HOST: &str = "localhost:0";

/// Reports the network module and checks that name resolution works.
pub fn init() {
    tracing::info!(target: "net", version = env!("CARGO_PKG_VERSION"), "network module");
    match RESOLVE_HOST.to_socket_addrs() {
        Ok(addrs) => {
            tracing::info!(target: "net", host = RESOLVE_HOST, addresses = addrs.count(), "resolver ready");
        }
        Err(err) => tracing::warn!(target: "net", host = RESOLVE_HOST, %err, "resolver lookup failed"),
    }
}
