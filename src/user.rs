//! Users and the areas they watch.

use crate::area::MonitoredArea;
use crate::model::UserResponse;

/// A registered user.
///
/// Monitored areas are held by id. The areas themselves belong to the
/// registry; a user never creates or destroys one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: u32,
    name: String,
    email: String,
    monitored_areas: Vec<u32>,
}

impl User {
    pub fn new(id: u32, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            monitored_areas: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Ids of monitored areas, in the order they were first monitored.
    pub fn monitored_areas(&self) -> &[u32] {
        &self.monitored_areas
    }

    pub fn is_monitoring(&self, area_id: u32) -> bool {
        self.monitored_areas.contains(&area_id)
    }

    /// Start monitoring `area`.
    ///
    /// Returns `false` without changing anything if the area is already
    /// monitored.
    pub fn monitor(&mut self, area: &MonitoredArea) -> bool {
        if self.is_monitoring(area.id()) {
            return false;
        }

        self.monitored_areas.push(area.id());
        true
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            monitored_areas: self.monitored_areas.clone(),
        }
    }
}
