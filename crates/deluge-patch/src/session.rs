//! Document session: owns one parsed patch file from load to save.

use std::path::{Path, PathBuf};

use deluge_values::TypedValue;
use deluge_xml::{parse, serialize, Document};

use crate::catalogue::{self, FieldDescriptor};
use crate::error::{OverlayError, SessionError};
use crate::overlay::Overlay;
use crate::params::{self, ParamSlot};
use crate::patch::{self, KitRow, PatchType, SoundRef, VersionInfo};
use crate::routing::{self, PatchCable};
use crate::samples::{self, SampleRemap};
use crate::variant::SoundVariant;

/// One open patch.
///
/// The session exclusively owns the tree; handles only carry paths into it.
/// After [`Session::close`] every operation fails with
/// [`SessionError::Closed`].
#[derive(Debug)]
pub struct Session {
    path: Option<PathBuf>,
    doc: Option<Document>,
    overlay: Overlay,
    modified: bool,
}

impl Session {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = parse(&bytes).map_err(|source| SessionError::ParseFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "opened patch");
        Ok(Self {
            path: Some(path.to_path_buf()),
            doc: Some(doc),
            overlay: Overlay::default(),
            modified: false,
        })
    }

    /// A session over in-memory bytes with no file path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionError> {
        Ok(Self {
            path: None,
            doc: Some(parse(bytes)?),
            overlay: Overlay::default(),
            modified: false,
        })
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn document(&self) -> Result<&Document, SessionError> {
        self.doc.as_ref().ok_or(SessionError::Closed)
    }

    fn document_mut(&mut self) -> Result<&mut Document, SessionError> {
        self.doc.as_mut().ok_or(SessionError::Closed)
    }

    pub fn patch_type(&self) -> Result<PatchType, SessionError> {
        Ok(PatchType::detect(self.document()?)?)
    }

    pub fn version_info(&self) -> Result<VersionInfo, SessionError> {
        Ok(patch::version_info(self.document()?)?)
    }

    pub fn sounds(&self) -> Result<Vec<SoundRef>, SessionError> {
        Ok(patch::sounds(self.document()?)?)
    }

    pub fn sound_count(&self) -> Result<usize, SessionError> {
        Ok(self.sounds()?.len())
    }

    /// Rows of a kit in order, sound rows included. Empty for a synth.
    pub fn kit_rows(&self) -> Result<Vec<KitRow>, SessionError> {
        Ok(patch::kit_rows(self.document()?)?)
    }

    pub fn sample_paths(&self) -> Result<Vec<String>, SessionError> {
        Ok(samples::sample_paths(self.document()?))
    }

    /// Rewrite sample references. Returns how many changed.
    pub fn remap_samples(&mut self, remap: &SampleRemap) -> Result<usize, SessionError> {
        let changed = remap
            .apply(self.document_mut()?)
            .map_err(OverlayError::from)?;
        if changed > 0 {
            self.modified = true;
            tracing::info!(changed, "remapped sample paths");
        }
        Ok(changed)
    }

    fn sound_ref(&self, index: usize) -> Result<SoundRef, SessionError> {
        Ok(patch::sound(self.document()?, index)?)
    }

    /// A handle on sound `index`.
    pub fn sound(&mut self, index: usize) -> Result<SoundHandle<'_>, SessionError> {
        let sound = self.sound_ref(index)?;
        Ok(SoundHandle {
            session: self,
            sound,
        })
    }

    pub fn variant(&self, sound: usize) -> Result<SoundVariant, SessionError> {
        let r = self.sound_ref(sound)?;
        Ok(self.overlay.variant(self.document()?, &r)?)
    }

    pub fn get(&self, sound: usize, field: &str) -> Result<TypedValue, SessionError> {
        let r = self.sound_ref(sound)?;
        Ok(self.overlay.get(self.document()?, &r, field)?)
    }

    pub fn set(
        &mut self,
        sound: usize,
        field: &str,
        value: &TypedValue,
    ) -> Result<bool, SessionError> {
        let r = self.sound_ref(sound)?;
        let doc = self.doc.as_mut().ok_or(SessionError::Closed)?;
        let changed = self.overlay.set(doc, &r, field, value)?;
        self.modified |= changed;
        Ok(changed)
    }

    /// Like [`Session::set`], parsing the value from text.
    pub fn set_input(
        &mut self,
        sound: usize,
        field: &str,
        input: &str,
    ) -> Result<bool, SessionError> {
        let r = self.sound_ref(sound)?;
        let doc = self.doc.as_mut().ok_or(SessionError::Closed)?;
        let changed = self.overlay.set_input(doc, &r, field, input)?;
        self.modified |= changed;
        Ok(changed)
    }

    /// The bytes [`Session::save`] would write.
    pub fn serialize(&self) -> Result<Vec<u8>, SessionError> {
        Ok(serialize(self.document()?))
    }

    /// Write back to the file the session was opened from.
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.document()?;
        let path = self.path.clone().ok_or(SessionError::NoPath)?;
        self.write_to(&path)
    }

    /// Write to `path`, which becomes the session's file on success.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), SessionError> {
        let bytes = self.serialize()?;
        std::fs::write(path, &bytes).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.modified = false;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved patch");
        Ok(())
    }

    /// Drop the tree. Unsaved edits are discarded.
    pub fn close(&mut self) {
        if self.modified {
            tracing::warn!(path = ?self.path, "closing session with unsaved edits");
        }
        self.doc = None;
        self.modified = false;
    }

    pub fn is_closed(&self) -> bool {
        self.doc.is_none()
    }
}

/// A sound of an open session, addressed by its position.
pub struct SoundHandle<'a> {
    session: &'a mut Session,
    sound: SoundRef,
}

impl<'a> SoundHandle<'a> {
    pub fn index(&self) -> usize {
        self.sound.index
    }

    pub fn sound_ref(&self) -> &SoundRef {
        &self.sound
    }

    pub fn variant(&self) -> Result<SoundVariant, SessionError> {
        Ok(self.session.overlay.variant(self.session.document()?, &self.sound)?)
    }

    /// The fields this sound's variant has.
    pub fn fields(&self) -> Result<Vec<&'static FieldDescriptor>, SessionError> {
        Ok(catalogue::field_table(self.variant()?))
    }

    pub fn get(&self, field: &str) -> Result<TypedValue, SessionError> {
        Ok(self.session.overlay.get(self.session.document()?, &self.sound, field)?)
    }

    pub fn get_raw(&self, field: &str) -> Result<String, SessionError> {
        Ok(self
            .session
            .overlay
            .get_raw(self.session.document()?, &self.sound, field)?)
    }

    pub fn read_all(&self) -> Result<Vec<(String, TypedValue)>, SessionError> {
        Ok(self.session.overlay.read_all(self.session.document()?, &self.sound)?)
    }

    pub fn set(&mut self, field: &str, value: &TypedValue) -> Result<bool, SessionError> {
        let session = &mut *self.session;
        let doc = session.doc.as_mut().ok_or(SessionError::Closed)?;
        let changed = session.overlay.set(doc, &self.sound, field, value)?;
        session.modified |= changed;
        Ok(changed)
    }

    pub fn set_input(&mut self, field: &str, input: &str) -> Result<bool, SessionError> {
        let session = &mut *self.session;
        let doc = session.doc.as_mut().ok_or(SessionError::Closed)?;
        let changed = session.overlay.set_input(doc, &self.sound, field, input)?;
        session.modified |= changed;
        Ok(changed)
    }

    pub fn routes(&self) -> Result<Vec<PatchCable>, SessionError> {
        Ok(routing::list_routes(self.session.document()?, &self.sound)?)
    }

    pub fn add_route(&mut self, cable: &PatchCable) -> Result<usize, SessionError> {
        let index = routing::add_route(self.session.document_mut()?, &self.sound, cable)?;
        self.session.modified = true;
        Ok(index)
    }

    pub fn remove_route(&mut self, index: usize) -> Result<PatchCable, SessionError> {
        let cable = routing::remove_route(self.session.document_mut()?, &self.sound, index)?;
        self.session.modified = true;
        Ok(cable)
    }

    pub fn set_route_amount(&mut self, index: usize, amount: i32) -> Result<bool, SessionError> {
        let changed =
            routing::set_amount(self.session.document_mut()?, &self.sound, index, amount)?;
        self.session.modified |= changed;
        Ok(changed)
    }

    pub fn set_route_source(&mut self, index: usize, source: &str) -> Result<bool, SessionError> {
        let changed =
            routing::set_source(self.session.document_mut()?, &self.sound, index, source)?;
        self.session.modified |= changed;
        Ok(changed)
    }

    pub fn set_route_destination(
        &mut self,
        index: usize,
        destination: &str,
    ) -> Result<bool, SessionError> {
        let doc = self.session.document_mut()?;
        let changed = routing::set_destination(doc, &self.sound, index, destination)?;
        self.session.modified |= changed;
        Ok(changed)
    }

    pub fn default_params(&self) -> Result<Vec<ParamSlot>, SessionError> {
        Ok(params::slots(self.session.document()?, &self.sound)?)
    }

    pub fn write_default_params(&mut self, values: &[String]) -> Result<usize, SessionError> {
        let changed = params::write_slots(self.session.document_mut()?, &self.sound, values)?;
        self.session.modified |= changed > 0;
        Ok(changed)
    }
}
