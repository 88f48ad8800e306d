//! 配置验证模块
//!
//! 验证规则：
//! - 字段取值范围 (contracts 类型上的 `validator` derive)
//! - endpoint 必须使用 ws:// (wss:// 需要 TLS，当前构建未包含)
//! - credential 如果存在则不能为空白
//! - sensor_id 不能为空白

use contracts::{ContractError, EmitterBlueprint, ModelKind};
use validator::Validate;

/// 验证 EmitterBlueprint
///
/// 返回遇到的第一个错误，或 Ok(())。
pub fn validate(blueprint: &EmitterBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_endpoint(blueprint)?;
    validate_sensor_id(blueprint)?;
    Ok(())
}

/// 值得提示给操作者的非致命问题
pub fn warnings(blueprint: &EmitterBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let model = &blueprint.model;

    if model.kind == ModelKind::Replay {
        match &model.pattern_dir {
            None => warnings.push(
                "model.kind = replay without model.pattern_dir; parametric fallback will be used"
                    .to_string(),
            ),
            Some(dir) if !dir.is_dir() => warnings.push(format!(
                "model.pattern_dir '{}' does not exist; parametric fallback will be used",
                dir.display()
            )),
            Some(_) => {}
        }
    } else if model.pattern_dir.is_some() {
        warnings.push(format!(
            "model.pattern_dir is ignored for model.kind = {}",
            model.kind.as_str()
        ));
    }

    if model.kind == ModelKind::Ctg && model.parameters.is_some() {
        warnings.push(
            "model.parameters only adjusts the CTG idle uterine baseline".to_string(),
        );
    }

    if blueprint.stream.cadence_ms < 20 {
        warnings.push(format!(
            "stream.cadence_ms = {} is very aggressive for a remote endpoint",
            blueprint.stream.cadence_ms
        ));
    }

    warnings
}

/// 声明式范围检查
fn validate_fields(blueprint: &EmitterBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|e| {
        let mut fields: Vec<_> = e.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        ContractError::config_validation(fields.join(", "), e.to_string())
    })
}

/// Endpoint URL 协议
fn validate_endpoint(blueprint: &EmitterBlueprint) -> Result<(), ContractError> {
    let endpoint = &blueprint.endpoint;
    let address = endpoint.address.trim();

    if address.starts_with("wss://") {
        return Err(ContractError::config_validation(
            "endpoint.address",
            format!("wss:// is not supported by this build (no TLS), got '{address}'"),
        ));
    }

    if !address.starts_with("ws://") {
        return Err(ContractError::config_validation(
            "endpoint.address",
            format!("expected ws:// URL, got '{address}'"),
        ));
    }

    if let Some(credential) = &endpoint.credential {
        if credential.trim().is_empty() {
            return Err(ContractError::config_validation(
                "endpoint.credential",
                "credential cannot be blank (omit it instead)",
            ));
        }
    }

    Ok(())
}

/// 流标识
fn validate_sensor_id(blueprint: &EmitterBlueprint) -> Result<(), ContractError> {
    if blueprint.stream.sensor_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "stream.sensor_id",
            "sensor_id cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, EndpointConfig, GenerationParameters, ModelConfig, StreamConfig,
    };
    use std::path::PathBuf;

    fn minimal_blueprint() -> EmitterBlueprint {
        EmitterBlueprint {
            version: ConfigVersion::V1,
            endpoint: EndpointConfig {
                address: "ws://localhost:8080/ws".into(),
                credential: None,
            },
            stream: StreamConfig::default(),
            model: ModelConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_blueprint()).is_ok());
    }

    #[test]
    fn test_http_scheme_rejected() {
        let mut bp = minimal_blueprint();
        bp.endpoint.address = "http://localhost:8080/ws".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("expected ws://"), "got: {err}");
    }

    #[test]
    fn test_tls_scheme_rejected() {
        let mut bp = minimal_blueprint();
        bp.endpoint.address = "wss://127.0.0.1:8443/ws".into();
        let err = validate(&bp).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ConfigValidation { ref field, .. } if field == "endpoint.address"
        ));
        assert!(err.to_string().contains("no TLS"), "got: {err}");
    }

    #[test]
    fn test_empty_address_rejected() {
        let mut bp = minimal_blueprint();
        bp.endpoint.address = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("address"), "got: {err}");
    }

    #[test]
    fn test_blank_credential_rejected() {
        let mut bp = minimal_blueprint();
        bp.endpoint.credential = Some("   ".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("credential"), "got: {err}");
    }

    #[test]
    fn test_cadence_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.stream.cadence_ms = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("stream"), "got: {err}");
    }

    #[test]
    fn test_noise_level_out_of_range() {
        let mut bp = minimal_blueprint();
        let mut params = GenerationParameters::default();
        params.noise_level = 2.0;
        bp.model.parameters = Some(params);
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_hypoxia_probability_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.model.hypoxia_probability = 1.5;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_replay_speed_must_be_positive() {
        let mut bp = minimal_blueprint();
        bp.model.replay_speed = 0.0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_blank_sensor_id_rejected() {
        let mut bp = minimal_blueprint();
        bp.stream.sensor_id = " ".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("sensor_id"), "got: {err}");
    }

    #[test]
    fn test_replay_without_dir_warns() {
        let mut bp = minimal_blueprint();
        bp.model.kind = ModelKind::Replay;
        let found = warnings(&bp);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("pattern_dir"));

        bp.model.pattern_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(warnings(&bp)[0].contains("does not exist"));
    }

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(warnings(&minimal_blueprint()).is_empty());
    }
}
