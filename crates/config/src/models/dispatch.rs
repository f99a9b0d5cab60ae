use serde::{Deserialize, Serialize};

use crate::{ConfigResult, ConfigValidator};

/// 请求分发配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// 同时处理的请求上限，0 表示不限制
    #[serde(default)]
    pub max_concurrent_requests: usize,
}

impl DispatchConfig {
    pub fn is_bounded(&self) -> bool {
        self.max_concurrent_requests > 0
    }
}

impl ConfigValidator for DispatchConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}
