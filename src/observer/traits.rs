use async_trait::async_trait;

use crate::observer::context::RowContext;
use crate::observer::error::ObserverError;

/// Observer rings - every observer of a lower ring finishes before a higher ring starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ObserverRing {
    Entity = 0,    // Primary entity upsert, publishes the entity id
    Dependent = 1, // Records keyed off the published entity id
}

impl ObserverRing {
    /// Rings in execution order
    pub fn all() -> [Self; 2] {
        [ObserverRing::Entity, ObserverRing::Dependent]
    }
}

/// Base trait for all observers with metadata and ordering declarations
pub trait Observer: Send + Sync {
    /// Observer name for logging and dependency declarations
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    /// Observers that must run earlier in the same row
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Ring 0: Entity - may publish into the row context
#[async_trait]
pub trait EntityObserver: Observer {
    async fn execute(&self, ctx: &mut RowContext<'_>) -> Result<(), ObserverError>;
}

/// Ring 1: Dependent - reads what the entity ring published, never writes it
#[async_trait]
pub trait DependentObserver: Observer {
    async fn execute(&self, ctx: &RowContext<'_>) -> Result<(), ObserverError>;
}

/// Concrete observer types for dynamic dispatch
pub enum ObserverBox {
    Entity(Box<dyn EntityObserver>),
    Dependent(Box<dyn DependentObserver>),
}

impl ObserverBox {
    pub fn name(&self) -> &'static str {
        match self {
            ObserverBox::Entity(o) => o.name(),
            ObserverBox::Dependent(o) => o.name(),
        }
    }

    pub fn ring(&self) -> ObserverRing {
        match self {
            ObserverBox::Entity(o) => o.ring(),
            ObserverBox::Dependent(o) => o.ring(),
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            ObserverBox::Entity(o) => o.priority(),
            ObserverBox::Dependent(o) => o.priority(),
        }
    }

    pub fn requires(&self) -> &'static [&'static str] {
        match self {
            ObserverBox::Entity(o) => o.requires(),
            ObserverBox::Dependent(o) => o.requires(),
        }
    }

    pub async fn execute(&self, ctx: &mut RowContext<'_>) -> Result<(), ObserverError> {
        match self {
            ObserverBox::Entity(o) => o.execute(ctx).await,
            ObserverBox::Dependent(o) => o.execute(ctx).await,
        }
    }
}
