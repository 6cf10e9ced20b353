use std::net::{IpAddr, SocketAddr};

use log::info;
use warp::Filter;

use super::handlers::AppState;
use super::routes::routes;
use crate::error_handling::types::WebError;

/// Name of the access log target; every request is logged under it.
pub const ACCESS_LOG_TARGET: &str = "sessionshelf::access";

/// Web server for the session HTTP API
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the web server on the given address and port
    pub async fn start(&self, bind_address: &str, port: u16) -> Result<(), WebError> {
        let addr = listen_addr(bind_address, port)?;
        let routes = routes(self.state.clone()).with(warp::log(ACCESS_LOG_TARGET));
        info!("Web server listening on http://{}", addr);
        warp::serve(routes).run(addr).await;
        Ok(())
    }
}

fn listen_addr(bind_address: &str, port: u16) -> Result<SocketAddr, WebError> {
    let ip: IpAddr = bind_address
        .parse()
        .map_err(|_| WebError::BadBindAddress(bind_address.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn listen_addr_needs_an_ip() {
        let addr = assert_ok!(listen_addr("127.0.0.1", 8080));
        assert_eq!(addr.port(), 8080);
        assert_err!(listen_addr("example.com", 8080));
    }
}
