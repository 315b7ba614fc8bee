//! # GET /.well-known/login-info
//!
//! クライアントがミント前にコントラクトIDの一致を確認するためのエンドポイント。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use login_types::LoginInfo;

use crate::config::AppState;

pub async fn handle_login_info(State(state): State<Arc<AppState>>) -> Json<LoginInfo> {
    Json(LoginInfo {
        contract_id: state.contract_id().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_helpers::{Fixture, CONTRACT_ID};

    #[tokio::test]
    async fn test_advertises_contract_id() {
        let fx = Fixture::new();
        let Json(info) = handle_login_info(State(fx.state.clone())).await;
        assert_eq!(info.contract_id, CONTRACT_ID);
    }
}
