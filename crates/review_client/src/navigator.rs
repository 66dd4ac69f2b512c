use anyhow::{Context, Result};
use shared::domain::InstanceIndex;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    Prev,
    Next,
    Goto(InstanceIndex),
    Logout,
    LeftInstances,
}

/// A full navigation away from the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    Instance(InstanceIndex),
    Logout,
    LeftInstances,
}

impl NavigationTarget {
    pub fn path(&self) -> String {
        match self {
            Self::Instance(index) => index.address(),
            Self::Logout => "/logout".to_string(),
            Self::LeftInstances => "/left-instances".to_string(),
        }
    }

    /// Side views open in a separate browsing context and leave the review
    /// page in place.
    pub fn opens_new_context(&self) -> bool {
        matches!(self, Self::LeftInstances)
    }

    pub fn url(&self, base: &Url) -> Result<Url> {
        let path = self.path();
        base.join(path.trim_start_matches('/'))
            .with_context(|| format!("failed to build navigation url for {path}"))
    }
}

/// Boundary reached by `prev` at the first instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtFirstInstance;

pub fn resolve(
    intent: NavigationIntent,
    current: InstanceIndex,
) -> Result<NavigationTarget, AtFirstInstance> {
    match intent {
        NavigationIntent::Prev => current
            .prev()
            .map(NavigationTarget::Instance)
            .ok_or(AtFirstInstance),
        NavigationIntent::Next => Ok(NavigationTarget::Instance(current.next())),
        NavigationIntent::Goto(index) => Ok(NavigationTarget::Instance(index)),
        NavigationIntent::Logout => Ok(NavigationTarget::Logout),
        NavigationIntent::LeftInstances => Ok(NavigationTarget::LeftInstances),
    }
}
