// ==========================================
// MES 后端 - 访问控制策略
// ==========================================
// 职责: 根据 (调用方, 动作, 资源) 给出 Allow/Deny
// 约束: 处理函数不直接比较角色字符串，统一经由 AccessPolicy
// ==========================================

use crate::domain::types::Role;
use serde::{Deserialize, Serialize};

/// 已认证的调用方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Machine,
    ProductionLine,
    Product,
    WorkOrder,
    Shift,
    Stop,
    Alarm,
    Event,
    User,
    Profile,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// 需要登录
    Unauthenticated,
    /// 已登录但角色不足
    InsufficientRole { role: Role },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// 访问控制策略
pub trait AccessPolicy: Send + Sync {
    fn authorize(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Resource,
    ) -> Decision;
}

/// 谁可以执行某个动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_OR_MODERATOR: &[Role] = &[Role::Admin, Role::Moderator];
const ANY_ROLE: &[Role] = &[Role::Admin, Role::Moderator, Role::User];

// ==========================================
// RolePolicy - 默认基于角色的策略
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    fn requirement(action: Action, resource: Resource) -> Requirement {
        use Action::*;
        use Resource::*;

        match (resource, action) {
            (Machine | ProductionLine | Product | WorkOrder, Read) => Requirement::Public,
            (Machine | ProductionLine | Product | WorkOrder, Create | Update) => {
                Requirement::Roles(ADMIN_OR_MODERATOR)
            }
            (Machine | ProductionLine | Product | WorkOrder, Delete) => Requirement::Roles(ADMIN),

            (Shift, Read) => Requirement::Public,
            (Shift, Create | Update) => Requirement::Roles(ANY_ROLE),
            (Shift, Delete) => Requirement::Roles(ADMIN),

            (Stop | Alarm | Event, Read) => Requirement::Public,
            (Stop | Alarm | Event, _) => Requirement::Authenticated,

            (User, Read) => Requirement::Authenticated,
            (User, _) => Requirement::Roles(ADMIN),

            (Profile, _) => Requirement::Authenticated,

            (Config, Read) => Requirement::Authenticated,
            (Config, _) => Requirement::Roles(ADMIN),
        }
    }
}

impl AccessPolicy for RolePolicy {
    fn authorize(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Resource,
    ) -> Decision {
        match (Self::requirement(action, resource), principal) {
            (Requirement::Public, _) => Decision::Allow,
            (_, None) => Decision::Deny(DenyReason::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => Decision::Allow,
            (Requirement::Roles(roles), Some(p)) => {
                if roles.contains(&p.role) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::InsufficientRole { role: p.role })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(role: Role) -> Principal {
        Principal {
            user_id: 1,
            username: "u".to_string(),
            role,
        }
    }

    #[test]
    fn test_public_reads() {
        let policy = RolePolicy;
        for resource in [Resource::Machine, Resource::ProductionLine, Resource::Shift, Resource::Stop] {
            assert!(policy.authorize(None, Action::Read, resource).is_allowed());
        }
    }

    #[test]
    fn test_machine_writes_by_role() {
        let policy = RolePolicy;
        let admin = who(Role::Admin);
        let moderator = who(Role::Moderator);
        let user = who(Role::User);

        assert!(policy.authorize(Some(&moderator), Action::Create, Resource::Machine).is_allowed());
        assert_eq!(
            policy.authorize(Some(&user), Action::Update, Resource::Machine),
            Decision::Deny(DenyReason::InsufficientRole { role: Role::User })
        );
        assert!(policy.authorize(Some(&admin), Action::Delete, Resource::Machine).is_allowed());
        assert!(!policy.authorize(Some(&moderator), Action::Delete, Resource::Machine).is_allowed());
    }

    #[test]
    fn test_anonymous_write_is_unauthenticated() {
        assert_eq!(
            RolePolicy.authorize(None, Action::Create, Resource::WorkOrder),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            RolePolicy.authorize(None, Action::Read, Resource::User),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_shift_and_user_rules() {
        let policy = RolePolicy;
        let user = who(Role::User);
        assert!(policy.authorize(Some(&user), Action::Create, Resource::Shift).is_allowed());
        assert!(!policy.authorize(Some(&user), Action::Delete, Resource::Shift).is_allowed());
        assert!(policy.authorize(Some(&user), Action::Read, Resource::User).is_allowed());
        assert!(!policy.authorize(Some(&user), Action::Create, Resource::User).is_allowed());
        assert!(policy.authorize(Some(&user), Action::Update, Resource::Profile).is_allowed());
        assert!(policy.authorize(Some(&user), Action::Create, Resource::Stop).is_allowed());
    }
}
