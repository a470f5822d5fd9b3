//! In-memory registry of areas and users.
//!
//! The registry is an explicit object handed to whoever needs it; there is no
//! global state. It is cheap to clone and safe to share between request
//! handlers.
//!
//! # Locking
//!
//! The area and user maps are each guarded by a [`RwLock`]. Every area and
//! every user additionally sits behind its own [`Mutex`], so appends to one
//! area never block another. Map locks are released before an entity lock is
//! taken. Workflows that need a user and an area lock the user first.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::area::MonitoredArea;
use crate::error::{Error, Result};
use crate::model::Alert;
use crate::risk::{self, RiskAssessment};
use crate::user::User;

/// An area shared between the registry and its callers.
pub type SharedArea = Arc<Mutex<MonitoredArea>>;

/// A user shared between the registry and its callers.
pub type SharedUser = Arc<Mutex<User>>;

/// Result of a user monitoring an area.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOutcome {
    /// False when the user was already monitoring the area.
    pub newly_monitored: bool,
    pub assessment: RiskAssessment,
}

/// Registry of monitored areas and users, in registration order.
#[derive(Clone, Default)]
pub struct Registry {
    areas: Arc<RwLock<IndexMap<u32, SharedArea>>>,
    users: Arc<RwLock<IndexMap<u32, SharedUser>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Areas
    // ------------------------------------------------------------------

    /// Register a new area.
    ///
    /// Fails with [`Error::DuplicateArea`] if the id is taken.
    pub async fn create_area(&self, area: MonitoredArea) -> Result<SharedArea> {
        let mut areas = self.areas.write().await;

        let id = area.id();
        if areas.contains_key(&id) {
            return Err(Error::DuplicateArea(id));
        }

        info!(area_id = id, name = %area.name(), "Area registered");

        let shared = Arc::new(Mutex::new(area));
        areas.insert(id, Arc::clone(&shared));

        Ok(shared)
    }

    pub async fn list_areas(&self) -> Vec<SharedArea> {
        self.areas.read().await.values().cloned().collect()
    }

    pub async fn find_area(&self, id: u32) -> Result<SharedArea> {
        self.areas
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::AreaNotFound(id))
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Register a user under the next free id: 1 for the first user, then the
    /// highest existing id plus one.
    pub async fn register_user(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> SharedUser {
        let mut users = self.users.write().await;

        let id = users
            .keys()
            .max()
            .map_or(1, |highest| highest.saturating_add(1));
        let user = User::new(id, name, email);

        info!(user_id = id, "User registered");

        let shared = Arc::new(Mutex::new(user));
        users.insert(id, Arc::clone(&shared));

        shared
    }

    pub async fn list_users(&self) -> Vec<SharedUser> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn find_user(&self, id: u32) -> Result<SharedUser> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::UserNotFound(id))
    }

    // ------------------------------------------------------------------
    // Workflows
    // ------------------------------------------------------------------

    /// Have a user monitor an area, then assess the area's current risk and
    /// raise an automatic alert if it is strictly above `threshold`.
    ///
    /// The area stays monitored even when the assessment fails for lack of
    /// weather data.
    pub async fn monitor_area(
        &self,
        user_id: u32,
        area_id: u32,
        threshold: f64,
    ) -> Result<MonitorOutcome> {
        let user = self.find_user(user_id).await?;
        let area = self.find_area(area_id).await?;

        let mut user = user.lock().await;
        let mut area = area.lock().await;

        let newly_monitored = user.monitor(&area);
        if newly_monitored {
            info!(user_id, area_id, "Monitoring area");
        }

        let assessment = risk::assess_area(&mut area, threshold)?;

        Ok(MonitorOutcome {
            newly_monitored,
            assessment,
        })
    }

    /// Raise a manual alert on an area the user monitors.
    ///
    /// Fails with [`Error::AreaNotMonitored`] if the user has not monitored
    /// the area.
    pub async fn raise_manual_alert(
        &self,
        user_id: u32,
        area_id: u32,
        risk_level: f64,
        description: &str,
    ) -> Result<Alert> {
        let user = self.find_user(user_id).await?;
        let area = self.find_area(area_id).await?;

        let user = user.lock().await;
        if !user.is_monitoring(area_id) {
            return Err(Error::AreaNotMonitored { user_id, area_id });
        }

        let mut area = area.lock().await;
        let alert = area.generate_manual_alert(risk_level, Some(&*user), description)?;

        Ok(alert.clone())
    }
}
