//! LUT image loading. Decoding an image file is explicitly out of scope for
//! this workspace's core (spec §1 "CPU↔GPU pixel-format converter" and image
//! I/O are external collaborators); callers supply a [`LutLoader`] so the
//! core never touches a file format decoder directly.

use slangfx_common::Image;
use std::path::Path;

pub trait LutLoader {
    fn load(&self, path: &Path) -> Result<Image, String>;
}

/// A loader that always fails; useful for chains that never reference a
/// `textures = ...` section and don't want to pull in a real decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLutLoader;

impl LutLoader for NullLutLoader {
    fn load(&self, path: &Path) -> Result<Image, String> {
        Err(format!("no LUT loader configured, cannot load {}", path.display()))
    }
}
