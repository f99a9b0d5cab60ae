//! 路由键约定：`"<服务名>.<端点名>"`

/// 服务队列绑定键，匹配该服务下的所有端点
pub fn binding_key(service_name: &str) -> String {
    format!("{service_name}.#")
}

pub fn routing_key(service_name: &str, endpoint_name: &str) -> String {
    format!("{service_name}.{endpoint_name}")
}

/// 去掉 `"<服务名>."` 前缀得到端点名称；没有该前缀时原样返回
pub fn endpoint_name<'a>(service_name: &str, routing_key: &'a str) -> &'a str {
    routing_key
        .strip_prefix(service_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(routing_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_name_strips_service_prefix() {
        assert_eq!(endpoint_name("users", "users.get"), "get");
        assert_eq!(endpoint_name("users", "users.profile.update"), "profile.update");
    }

    #[test]
    fn test_endpoint_name_without_prefix_is_unchanged() {
        assert_eq!(endpoint_name("users", "orders.get"), "orders.get");
        assert_eq!(endpoint_name("users", "usersget"), "usersget");
        assert_eq!(endpoint_name("users", "get"), "get");
    }

    #[test]
    fn test_routing_and_binding_keys() {
        assert_eq!(routing_key("users", "get"), "users.get");
        assert_eq!(binding_key("users"), "users.#");
        let key = routing_key("users", "get");
        assert_eq!(endpoint_name("users", &key), "get");
    }
}
