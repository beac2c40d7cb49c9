//! The map surface capability
//!
//! The core never talks to a renderer directly. Anything that can set a view,
//! place markers and show popups implements [`MapSurface`]; the egui painter
//! in `ui::surface` is one implementation, [`RecordingSurface`] is another.

use crate::{
    core::geo::LatLng,
    layers::{marker::{MarkerKey, RenderedMarker}, registry::MarkerHandle},
    ui::{overlay::OverlayPanel, popup::PopupContent},
    MapError, Result,
};

pub trait MapSurface {
    /// True once the surface accepts imperative commands
    fn is_ready(&self) -> bool;

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()>;

    fn mount_marker(&mut self, marker: &RenderedMarker) -> Result<MarkerHandle>;

    fn update_marker(&mut self, handle: MarkerHandle, marker: &RenderedMarker) -> Result<()>;

    fn unmount_marker(&mut self, handle: MarkerHandle) -> Result<()>;

    /// Opens the popup anchored at a mounted marker, replacing any open one
    fn open_popup(&mut self, handle: MarkerHandle, content: &PopupContent) -> Result<()>;

    fn close_popup(&mut self) -> Result<()>;

    fn show_overlays(&mut self, _panels: &[OverlayPanel]) -> Result<()> {
        Ok(())
    }
}

/// Logs a failed surface command; the core degrades instead of propagating
pub(crate) fn settle(_op: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(_err) => {
            #[cfg(feature = "debug")]
            log::warn!("surface command {_op} failed: {_err}");
            false
        }
    }
}

/// A command as observed by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    SetView { center: LatLng, zoom: f64 },
    Mount { handle: MarkerHandle, key: MarkerKey, highlighted: bool },
    Update { handle: MarkerHandle, key: MarkerKey, highlighted: bool },
    Unmount { handle: MarkerHandle },
    OpenPopup { handle: MarkerHandle, title: String },
    ClosePopup,
    ShowOverlays { titles: Vec<&'static str> },
}

/// Headless surface that records every command it receives.
///
/// Rejects commands while not ready, so callers that skip the readiness
/// check show up as errors.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ready: bool,
    next_handle: u64,
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Returns and clears the recorded commands
    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn last_view(&self) -> Option<(LatLng, f64)> {
        self.commands.iter().rev().find_map(|c| match c {
            SurfaceCommand::SetView { center, zoom } => Some((*center, *zoom)),
            _ => None,
        })
    }

    fn record(&mut self, command: SurfaceCommand) -> Result<()> {
        if !self.ready {
            return Err(MapError::Surface("surface not ready".to_string()));
        }
        self.commands.push(command);
        Ok(())
    }
}

impl MapSurface for RecordingSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        self.record(SurfaceCommand::SetView { center, zoom })
    }

    fn mount_marker(&mut self, marker: &RenderedMarker) -> Result<MarkerHandle> {
        let handle = MarkerHandle(self.next_handle);
        self.record(SurfaceCommand::Mount {
            handle,
            key: marker.key.clone(),
            highlighted: marker.highlighted,
        })?;
        self.next_handle += 1;
        Ok(handle)
    }

    fn update_marker(&mut self, handle: MarkerHandle, marker: &RenderedMarker) -> Result<()> {
        self.record(SurfaceCommand::Update {
            handle,
            key: marker.key.clone(),
            highlighted: marker.highlighted,
        })
    }

    fn unmount_marker(&mut self, handle: MarkerHandle) -> Result<()> {
        self.record(SurfaceCommand::Unmount { handle })
    }

    fn open_popup(&mut self, handle: MarkerHandle, content: &PopupContent) -> Result<()> {
        self.record(SurfaceCommand::OpenPopup {
            handle,
            title: content.title.clone(),
        })
    }

    fn close_popup(&mut self) -> Result<()> {
        self.record(SurfaceCommand::ClosePopup)
    }

    fn show_overlays(&mut self, panels: &[OverlayPanel]) -> Result<()> {
        self.record(SurfaceCommand::ShowOverlays {
            titles: panels.iter().map(|p| p.title).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_rejects_before_ready() {
        let mut surface = RecordingSurface::new();
        assert!(surface.set_view(LatLng::new(0.0, 0.0), 3.0).is_err());
        assert!(surface.commands().is_empty());
        assert!(!settle("set_view", surface.close_popup()));

        surface.set_ready(true);
        surface.set_view(LatLng::new(-26.0, 28.0), 15.0).unwrap();
        assert_eq!(surface.last_view(), Some((LatLng::new(-26.0, 28.0), 15.0)));
        assert_eq!(surface.take_commands().len(), 1);
        assert!(surface.commands().is_empty());
    }
}
