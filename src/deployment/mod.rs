mod events;

pub use events::{
    Component, ComponentStatus, InstallationPhase, ProcessEvent, ProcessUpdate, RenderAction,
};
