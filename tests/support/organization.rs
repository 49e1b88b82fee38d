use serde::{Deserialize, Serialize};
use syncstore::Payload;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub domain: String,
}

impl Payload for Organization {
    const COLLECTION: &'static str = "organizations";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Organization {
    pub fn new(id: &str, name: &str) -> Self {
        Organization {
            id: id.to_string(),
            name: name.to_string(),
            domain: format!("{}.com", name.to_lowercase()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpportunityTask {
    pub id: String,
    pub subject: String,
    pub organization_id: String,
}

impl Payload for OpportunityTask {
    const COLLECTION: &'static str = "tasks";
    fn id(&self) -> &str {
        &self.id
    }
}

impl OpportunityTask {
    pub fn new(id: &str, subject: &str, organization_id: &str) -> Self {
        OpportunityTask {
            id: id.to_string(),
            subject: subject.to_string(),
            organization_id: organization_id.to_string(),
        }
    }
}
