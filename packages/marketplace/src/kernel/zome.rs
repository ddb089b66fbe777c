//! Remote function naming.
//!
//! Every moderated domain exposes the same set of zome functions, named
//! after the entity: `create_service_type`, `get_pending_service_types`, ...

use crate::common::Status;

/// Names of the remote functions backing one moderated domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZomeFunctions {
    pub create: String,
    pub suggest: String,
    pub get: String,
    pub get_latest: String,
    pub update: String,
    pub delete: String,
    pub list_pending: String,
    pub list_approved: String,
    pub list_rejected: String,
    pub approve: String,
    pub reject: String,
    pub status_history: String,
}

impl ZomeFunctions {
    /// Default naming for an entity (`service_type`) and its plural
    /// (`service_types`).
    pub fn for_entity(name: &str, plural: &str) -> Self {
        Self {
            create: format!("create_{name}"),
            suggest: format!("suggest_{name}"),
            get: format!("get_{name}"),
            get_latest: format!("get_latest_{name}_record"),
            update: format!("update_{name}"),
            delete: format!("delete_{name}"),
            list_pending: format!("get_pending_{plural}"),
            list_approved: format!("get_approved_{plural}"),
            list_rejected: format!("get_rejected_{plural}"),
            approve: format!("approve_{name}"),
            reject: format!("reject_{name}"),
            status_history: format!("get_{name}_status_history"),
        }
    }

    pub fn list(&self, status: Status) -> &str {
        match status {
            Status::Pending => &self.list_pending,
            Status::Approved => &self.list_approved,
            Status::Rejected => &self.list_rejected,
        }
    }

    /// Status path a status-changing function moves an entity to.
    pub fn target_status(&self, fn_name: &str) -> Option<Status> {
        if fn_name == self.approve {
            Some(Status::Approved)
        } else if fn_name == self.reject {
            Some(Status::Rejected)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_entity() {
        let fns = ZomeFunctions::for_entity("service_type", "service_types");
        assert_eq!(fns.create, "create_service_type");
        assert_eq!(fns.get_latest, "get_latest_service_type_record");
        assert_eq!(fns.list(Status::Rejected), "get_rejected_service_types");
        assert_eq!(fns.target_status("approve_service_type"), Some(Status::Approved));
        assert_eq!(fns.target_status("create_service_type"), None);
    }
}
