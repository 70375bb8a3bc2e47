//! The `ovh_vps_info` module: read-only lookup of a VPS and its service info.

use tracing::info;

use super::args::InfoArgs;
use super::result::{ModuleOutcome, ModuleResult};
use crate::error::ModuleError;
use crate::ovh::{service_infos_path, vps_path, OvhApi};

/// Module name as registered with Ansible.
pub const MODULE_NAME: &str = "ovh_vps_info";

/// Fetches the VPS record and its service info.
///
/// Never reports a change. Check mode has no effect since nothing is
/// mutated.
///
/// # Errors
///
/// Returns [`ModuleError::NotFound`] if the service does not exist and
/// [`ModuleError::Api`] for any other provider failure.
pub async fn run<A: OvhApi + ?Sized>(api: &A, args: &InfoArgs) -> ModuleResult {
    let service = args.service_name.as_str();
    info!("Fetching VPS {service}");

    let vps_info = api
        .get(&vps_path(service))
        .await
        .map_err(|e| ModuleError::lookup(service, &e))?;

    let service_info = api
        .get(&service_infos_path(service))
        .await
        .map_err(|e| ModuleError::api(String::new(), &e))?;

    Ok(ModuleOutcome::unchanged()
        .with_data("vps_info", vps_info)
        .with_data("service_info", service_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, OvhVpsError};
    use crate::modules::result::to_ansible_json;
    use crate::ovh::MockOvhApi;
    use mockall::Sequence;
    use serde_json::json;

    fn args(service: &str) -> InfoArgs {
        InfoArgs {
            service_name: service.to_string(),
            ..InfoArgs::default()
        }
    }

    fn expect_get(
        api: &mut MockOvhApi,
        seq: &mut Sequence,
        expected: &'static str,
        response: crate::error::Result<serde_json::Value>,
    ) {
        let mut response = Some(response);
        api.expect_get()
            .withf(move |path: &str| path == expected)
            .times(1)
            .in_sequence(seq)
            .returning(move |_| {
                response
                    .take()
                    .unwrap_or_else(|| Err(OvhVpsError::internal("called twice")))
            });
    }

    #[tokio::test]
    async fn test_returns_both_records() {
        let mut api = MockOvhApi::new();
        let mut seq = Sequence::new();
        expect_get(
            &mut api,
            &mut seq,
            "/vps/vps1.ovh.net",
            Ok(json!({"name": "vps1.ovh.net", "netbootMode": "local"})),
        );
        expect_get(
            &mut api,
            &mut seq,
            "/vps/vps1.ovh.net/serviceInfos",
            Ok(json!({"status": "ok", "renew": {"automatic": true}})),
        );

        let outcome = run(&api, &args("vps1.ovh.net")).await.unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.get("vps_info"), Some(&json!({"name": "vps1.ovh.net", "netbootMode": "local"})));
        assert_eq!(outcome.get("service_info").and_then(|v| v.get("status")), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let mut api = MockOvhApi::new();
        let mut seq = Sequence::new();
        expect_get(
            &mut api,
            &mut seq,
            "/vps/nope.ovh.net",
            Err(ApiError::from_status(404, "This service does not exist").into()),
        );

        let result = run(&api, &args("nope.ovh.net")).await;

        let error = result.as_ref().unwrap_err();
        assert!(matches!(error, ModuleError::NotFound { .. }));
        assert_eq!(error.to_string(), "service nope.ovh.net does not exist");
        assert_eq!(to_ansible_json(&result)["changed"], json!(false));
    }

    #[tokio::test]
    async fn test_service_infos_failure() {
        let mut api = MockOvhApi::new();
        let mut seq = Sequence::new();
        expect_get(&mut api, &mut seq, "/vps/vps1.ovh.net", Ok(json!({"name": "vps1.ovh.net"})));
        expect_get(
            &mut api,
            &mut seq,
            "/vps/vps1.ovh.net/serviceInfos",
            Err(ApiError::from_status(503, "Service unavailable").into()),
        );

        let result = run(&api, &args("vps1.ovh.net")).await;

        let document = to_ansible_json(&result);
        assert_eq!(document["failed"], json!(true));
        assert_eq!(document["changed"], json!(false));
        assert_eq!(document["msg"], json!("Failed to call OVH API: Service unavailable"));
    }

    #[tokio::test]
    async fn test_lookup_failure_other_than_not_found() {
        let mut api = MockOvhApi::new();
        let mut seq = Sequence::new();
        expect_get(
            &mut api,
            &mut seq,
            "/vps/vps1.ovh.net",
            Err(ApiError::from_status(403, "This call has not been granted").into()),
        );

        let error = run(&api, &args("vps1.ovh.net")).await.unwrap_err();
        assert_eq!(error.to_string(), "Failed to call OVH API: This call has not been granted");
    }
}
