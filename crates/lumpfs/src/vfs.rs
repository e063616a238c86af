//! Mount manager
//!
//! [`Vfs`] owns every open container, the primary, auxiliary and Zip
//! indexes, the file identity set and the path mapping tables. Creating one
//! initializes the file system and [`Vfs::shutdown`] consumes it, so no
//! operation can run outside that lifetime.

use crate::cache::CacheTag;
use crate::config::VfsConfig;
use crate::container::{self, Container, ContainerKind, MountInfo, MountedFile};
use crate::entry::{ContainerId, EntryInfo};
use crate::handle::{FileHandle, OpenMode};
use crate::index::LumpIndex;
use crate::lumpnum::{IndexSelector, LumpNum};
use crate::mapping::{self, LumpDirectoryMapping, VirtualDirectoryMapping};
use crate::path::{self, FileId};
use crate::qualifier::{SizeCondition, split_size_qualifier};
use crate::{LUMP_DIRECTORY_LUMP, Result, VfsError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct AuxiliarySlot {
    index: LumpIndex,
    container: ContainerId,
}

/// Where a path resolved to
enum Location {
    Lump(Arc<EntryInfo>),
    RealFile(String),
}

/// An opened path together with its identity
struct Resolved {
    handle: FileHandle,
    identity: FileId,
    last_modified: i64,
}

/// The virtual file system context
#[derive(Debug)]
pub struct Vfs {
    config: VfsConfig,
    base: String,
    open_files: Vec<MountedFile>,
    loaded_files: Vec<ContainerId>,
    primary: LumpIndex,
    auxiliary: Option<AuxiliarySlot>,
    zip_index: LumpIndex,
    file_ids: HashSet<FileId>,
    virtual_directory_mappings: Vec<VirtualDirectoryMapping>,
    lump_directory_mappings: Vec<LumpDirectoryMapping>,
    required: HashSet<String>,
    next_id: u32,
    startup_complete: bool,
}

impl Vfs {
    /// Initialize a file system rooted at the configured base path
    pub fn new(config: VfsConfig) -> Self {
        let base = std::path::absolute(&config.base_path)
            .map_or_else(|_| path::from_native(&config.base_path), |p| path::from_native(&p));

        let virtual_directory_mappings = Self::resolve_mappings(&config, &base);
        let required = config
            .required_files
            .iter()
            .map(|file| path::lookup_key(&path::make_absolute(file, &base)))
            .collect();

        info!("Virtual file system initialized at {}", base);

        Self {
            config,
            base,
            open_files: Vec::new(),
            loaded_files: Vec::new(),
            primary: LumpIndex::new(),
            auxiliary: None,
            zip_index: LumpIndex::with_unique_paths(),
            file_ids: HashSet::new(),
            virtual_directory_mappings,
            lump_directory_mappings: Vec::new(),
            required,
            next_id: 0,
            startup_complete: false,
        }
    }

    /// Unload everything and tear the file system down
    pub fn shutdown(mut self) {
        self.close_auxiliary();

        let loaded: Vec<ContainerId> = self.loaded_files.iter().rev().copied().collect();
        for id in loaded {
            self.unload(id);
        }

        info!("Virtual file system shut down");
    }

    /// Configuration the file system was created with
    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    /// Absolute virtual base path
    pub fn base_path(&self) -> &str {
        &self.base
    }

    /// End the startup phase; files mounted from now on are not startup files
    pub fn end_startup(&mut self) {
        if !self.startup_complete {
            self.startup_complete = true;
            info!("End of startup: {} files loaded", self.loaded_files.len());
        }
    }

    /// Check if the startup phase has ended
    pub fn is_startup_complete(&self) -> bool {
        self.startup_complete
    }

    // Mounting

    /// Mount a file and publish its lumps.
    ///
    /// The path may name a real file or anything [`Vfs::open`] can resolve,
    /// such as a WAD stored inside a mounted PK3. Returns `None` when the
    /// file does not exist or is already loaded and duplicates are not
    /// allowed. A recognized archive with an inconsistent directory is an
    /// error; nothing is published in that case.
    pub fn add_file(&mut self, path: &str, allow_duplicate: bool) -> Result<Option<ContainerId>> {
        let absolute = self.make_absolute(path);
        let Some(resolved) = self.resolve(path, OpenMode::READ)? else {
            warn!("Cannot load {}: file not found", absolute);
            return Ok(None);
        };

        if !allow_duplicate && self.file_ids.contains(&resolved.identity) {
            warn!("{} is already loaded", absolute);
            return Ok(None);
        }

        let id = self.allocate_id();
        let startup = !self.startup_complete;
        let info = MountInfo {
            id,
            path: absolute,
            load_order: id.get(),
            startup,
            custom: true,
            file_id: Some(resolved.identity),
            last_modified: resolved.last_modified,
        };

        let mut file = container::interpret(resolved.handle, info, &self.base)?;
        if startup && file.is_iwad() {
            file.core_mut().set_custom(false);
        }

        let kind = file.kind();
        let published = if kind == ContainerKind::Zip {
            self.zip_index.catalog_lumps(&file, 0, file.lump_count())
        } else {
            self.primary.catalog_lumps(&file, 0, file.lump_count())
        };

        info!(
            "Loaded {} {} ({} lumps{})",
            kind,
            file.path(),
            published,
            if startup { ", startup" } else { "" }
        );

        let republish = holds_lump_directory(&file);
        self.file_ids.insert(resolved.identity);
        self.open_files.push(file);
        self.loaded_files.push(id);

        if republish {
            self.init_lump_directory_mappings();
        }

        Ok(Some(id))
    }

    /// Unmount a loaded file.
    ///
    /// Required files are refused unless `permit_required` is set. Returns
    /// whether the file was unloaded.
    pub fn remove_file(&mut self, path: &str, permit_required: bool) -> bool {
        let Some(id) = self.find_loaded(path) else {
            debug!("Cannot unload {}: not loaded", path);
            return false;
        };

        let Some(file) = self.container(id) else {
            return false;
        };
        if !permit_required && self.required.contains(&path::lookup_key(file.path())) {
            warn!("Refusing to unload required file {}", file.path());
            return false;
        }

        let republish = holds_lump_directory(file);
        self.unload(id);
        if republish {
            self.init_lump_directory_mappings();
        }
        true
    }

    /// Unload every non-startup file, newest first, and re-derive the path
    /// mappings. Returns the number of files unloaded.
    pub fn reset(&mut self) -> usize {
        self.close_auxiliary();

        let doomed: Vec<ContainerId> = self
            .loaded_files
            .iter()
            .rev()
            .copied()
            .filter(|&id| self.container(id).is_some_and(|f| !f.core().is_startup()))
            .collect();

        for &id in &doomed {
            self.unload(id);
        }

        self.file_ids = self
            .open_files
            .iter()
            .filter_map(|file| file.core().file_id())
            .collect();
        self.virtual_directory_mappings = Self::resolve_mappings(&self.config, &self.base);
        self.init_lump_directory_mappings();

        info!(
            "Reset: unloaded {} files, {} remain",
            doomed.len(),
            self.loaded_files.len()
        );
        doomed.len()
    }

    /// Check if a path names a loaded file
    pub fn is_loaded(&self, path: &str) -> bool {
        self.find_loaded(path).is_some()
    }

    /// Mark a file as required so [`Vfs::remove_file`] refuses it
    pub fn add_required_file(&mut self, path: &str) {
        let key = path::lookup_key(&self.make_absolute(path));
        self.required.insert(key);
    }

    fn unload(&mut self, id: ContainerId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };

        let mut file = self.open_files.remove(position);
        let released = file.clear_lump_cache();

        let mut pruned = self.primary.prune_by_file(id) + self.zip_index.prune_by_file(id);
        if let Some(auxiliary) = self.auxiliary.as_mut() {
            pruned += auxiliary.index.prune_by_file(id);
        }

        if let Some(file_id) = file.core().file_id() {
            let still_open = self
                .open_files
                .iter()
                .any(|other| other.core().file_id() == Some(file_id));
            if !still_open {
                self.file_ids.remove(&file_id);
            }
        }

        self.loaded_files.retain(|&loaded| loaded != id);

        info!(
            "Unloaded {} ({} lumps pruned, {} cached lumps released)",
            file.path(),
            pruned,
            released
        );
        true
    }

    // Auxiliary index

    /// Open a file into the auxiliary index.
    ///
    /// An auxiliary that is already open is closed first. Its lumps are
    /// addressed from [`LumpNum::AUXILIARY_START`] and take precedence over
    /// primary lumps in name lookups. Zip archives cannot be opened this way.
    pub fn open_auxiliary(&mut self, path: &str) -> Result<LumpNum> {
        if self.auxiliary.is_some() {
            self.close_auxiliary();
        }

        let absolute = self.make_absolute(path);
        let resolved = self
            .resolve(path, OpenMode::READ)?
            .ok_or_else(|| VfsError::AuxiliaryOpen(format!("{absolute}: file not found")))?;

        let id = self.allocate_id();
        let info = MountInfo {
            id,
            path: absolute.clone(),
            load_order: id.get(),
            startup: false,
            custom: true,
            file_id: None,
            last_modified: resolved.last_modified,
        };

        let file = container::interpret(resolved.handle, info, &self.base)?;
        if file.kind() == ContainerKind::Zip {
            return Err(VfsError::AuxiliaryOpen(format!(
                "{absolute}: Zip archives cannot be auxiliary"
            )));
        }

        let mut index = LumpIndex::new();
        index.catalog_lumps(&file, 0, file.lump_count());
        info!("Opened auxiliary {} ({} lumps)", absolute, index.len());

        self.open_files.push(file);
        self.auxiliary = Some(AuxiliarySlot {
            index,
            container: id,
        });

        Ok(LumpNum::AUXILIARY_START)
    }

    /// Close the auxiliary index, if one is open.
    ///
    /// Auxiliary lump numbers stop resolving until another is opened.
    pub fn close_auxiliary(&mut self) -> bool {
        let Some(slot) = self.auxiliary.take() else {
            return false;
        };

        if let Some(position) = self.position_of(slot.container) {
            let mut file = self.open_files.remove(position);
            file.clear_lump_cache();
            info!("Closed auxiliary {}", file.path());
        }
        true
    }

    /// Check if an auxiliary index is open
    pub fn has_auxiliary(&self) -> bool {
        self.auxiliary.is_some()
    }

    // Opening files

    /// Open a file or lump by path.
    ///
    /// Lookup order: the Zip index by absolute path, then lump-directory
    /// mappings, then lump names in the WAD indexes (auxiliary first) when
    /// the path is a bare name, then the real file system with
    /// virtual-directory mappings applied. Returns `None` if nothing
    /// matches.
    pub fn open(&self, path: &str, mode: OpenMode) -> Result<Option<FileHandle>> {
        let resolved = self.resolve(path, mode)?;
        if resolved.is_none() {
            debug!("{} not found", path);
        }
        Ok(resolved.map(|resolved| resolved.handle))
    }

    /// [`Vfs::open`] with an `fopen`-style mode string such as `"rb"`
    pub fn open_with_mode(&self, path: &str, mode: &str) -> Result<Option<FileHandle>> {
        self.open(path, OpenMode::parse(mode)?)
    }

    /// Check if a path can be opened, without reading anything
    pub fn access(&self, path: &str) -> bool {
        let absolute = self.make_absolute(path);
        self.locate(path, &absolute, OpenMode::READ).is_some()
    }

    fn resolve(&self, requested: &str, mode: OpenMode) -> Result<Option<Resolved>> {
        let absolute = self.make_absolute(requested);
        let Some(location) = self.locate(requested, &absolute, mode) else {
            return Ok(None);
        };

        let resolved = match location {
            Location::Lump(entry) => self.open_lump(&entry, &absolute, mode)?,
            Location::RealFile(native) => self.open_real_file(native)?,
        };
        Ok(Some(resolved))
    }

    fn locate(&self, requested: &str, absolute: &str, mode: OpenMode) -> Option<Location> {
        if !mode.real_file_only {
            if let Some(entry) = self.locate_lump(requested, absolute) {
                return Some(Location::Lump(entry));
            }
        }

        self.real_file_candidates(absolute)
            .into_iter()
            .find(|candidate| Path::new(candidate).is_file())
            .map(Location::RealFile)
    }

    fn locate_lump(&self, requested: &str, absolute: &str) -> Option<Arc<EntryInfo>> {
        if let Some(entry) = self
            .zip_index
            .index_for_path(absolute)
            .and_then(|index| self.zip_index.get(index))
        {
            return Some(Arc::clone(entry));
        }

        let key = path::lookup_key(absolute);
        let mapped = self
            .lump_directory_mappings
            .iter()
            .rev()
            .find(|mapping| path::lookup_key(&mapping.path) == key);
        if let Some(entry) = mapped.and_then(|mapping| self.find_lump_entry(&mapping.lump_name)) {
            return Some(entry);
        }

        if requested.contains(['/', '\\']) {
            return None;
        }
        self.find_lump_entry(requested)
    }

    fn open_lump(&self, entry: &EntryInfo, path: &str, mode: OpenMode) -> Result<Resolved> {
        let file = self
            .container(entry.container)
            .ok_or_else(|| VfsError::InvalidLumpIndex {
                container: entry.container.to_string(),
                index: entry.local_index,
            })?;

        let handle = if mode.no_buffer && !entry.is_compressed() {
            FileHandle::delegate(
                Arc::clone(file.core().handle()),
                entry.base_offset,
                entry.size as u64,
                path,
            )
        } else {
            let data = match file.core().cache().get(entry.local_index) {
                Some(data) => data,
                None => Arc::from(file.load_lump(entry.local_index)?),
            };
            FileHandle::from_buffer(data, path)
        };

        debug!("Opened lump {} from {} as {}", entry.name, file.path(), path);
        Ok(Resolved {
            handle,
            identity: FileId::from_path(path),
            last_modified: entry.last_modified,
        })
    }

    fn open_real_file(&self, native: String) -> Result<Resolved> {
        let identity = FileId::from_real_path(Path::new(&native));

        // A file that is already mounted is read through the container's
        // own handle
        if let Some(file) = self
            .open_files
            .iter()
            .find(|file| file.core().file_id() == Some(identity))
        {
            let shared = Arc::clone(file.core().handle());
            let length = shared.lock().len();
            return Ok(Resolved {
                handle: FileHandle::delegate(shared, 0, length, native),
                identity,
                last_modified: file.core().last_modified(),
            });
        }

        let handle = FileHandle::open_file(Path::new(&native), native.clone())?;
        Ok(Resolved {
            handle,
            identity,
            last_modified: modified_time(Path::new(&native)),
        })
    }

    fn real_file_candidates(&self, absolute: &str) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .virtual_directory_mappings
            .iter()
            .rev()
            .filter_map(|mapping| mapping.apply(absolute))
            .collect();
        candidates.push(absolute.to_string());
        candidates
    }

    // Path mappings

    /// Redirect a virtual directory to another one
    pub fn add_virtual_directory_mapping(&mut self, source: &str, destination: &str) {
        let mapping = VirtualDirectoryMapping::new(source, destination).resolved(&self.base);
        info!(
            "Mapped virtual directory {} to {}",
            mapping.source, mapping.destination
        );
        self.virtual_directory_mappings.push(mapping);
    }

    /// Active virtual-directory mappings
    pub fn virtual_directory_mappings(&self) -> &[VirtualDirectoryMapping] {
        &self.virtual_directory_mappings
    }

    /// Rebuild the lump-directory mappings from every `DD_DIREC` lump in the
    /// primary index. Returns the number of mappings.
    pub fn init_lump_directory_mappings(&mut self) -> usize {
        self.lump_directory_mappings.clear();
        if !self.config.load_lump_directory_mappings {
            return 0;
        }

        let mut mappings = Vec::new();
        for record in self
            .primary
            .iter()
            .filter(|record| record.name.eq_ignore_ascii_case(LUMP_DIRECTORY_LUMP))
        {
            let Some(file) = self.container(record.container) else {
                continue;
            };

            match file.load_lump(record.local_index) {
                Ok(data) => mappings.extend(mapping::parse_lump_directory(
                    &String::from_utf8_lossy(&data),
                    &self.base,
                )),
                Err(e) => warn!(
                    "Failed to read {} from {}: {}",
                    LUMP_DIRECTORY_LUMP,
                    file.path(),
                    e
                ),
            }
        }

        if !mappings.is_empty() {
            debug!("Derived {} lump-directory mappings", mappings.len());
        }
        self.lump_directory_mappings = mappings;
        self.lump_directory_mappings.len()
    }

    /// Active lump-directory mappings
    pub fn lump_directory_mappings(&self) -> &[LumpDirectoryMapping] {
        &self.lump_directory_mappings
    }

    // Name lookups

    /// Logical number of the newest lump with this name.
    ///
    /// The name may carry a size qualifier (`==N`, `>=N`, `<=N`); the newest
    /// lump whose size satisfies it is returned. The auxiliary index is
    /// searched before the primary one. A miss is logged unless `silent`.
    pub fn check_lump_num_for_name(&self, name: &str, silent: bool) -> Option<LumpNum> {
        let (lump_name, condition) = split_size_qualifier(name);
        if lump_name.is_empty() {
            if !silent {
                warn!("Empty lump name");
            }
            return None;
        }

        let found = self.find_lump_num(lump_name, condition);
        if found.is_none() && !silent {
            warn!("Lump {} not found", name);
        }
        found
    }

    /// [`Vfs::check_lump_num_for_name`] that logs misses
    pub fn lump_num_for_name(&self, name: &str) -> Option<LumpNum> {
        self.check_lump_num_for_name(name, false)
    }

    fn find_lump_num(&self, name: &str, condition: Option<SizeCondition>) -> Option<LumpNum> {
        if let Some(auxiliary) = &self.auxiliary {
            if let Some(index) = Self::search(&auxiliary.index, name, condition) {
                return LumpNum::auxiliary(index);
            }
        }
        Self::search(&self.primary, name, condition).and_then(LumpNum::primary)
    }

    fn find_lump_entry(&self, name: &str) -> Option<Arc<EntryInfo>> {
        let lump = self.find_lump_num(name, None)?;
        self.entry(lump).ok().cloned()
    }

    fn search(index: &LumpIndex, name: &str, condition: Option<SizeCondition>) -> Option<usize> {
        index.find_all_by_name(name).into_iter().find(|&position| {
            condition.is_none_or(|condition| {
                index
                    .get(position)
                    .is_some_and(|entry| condition.matches(entry.size))
            })
        })
    }

    // Lump access by logical number

    fn entry(&self, lump: LumpNum) -> Result<&Arc<EntryInfo>> {
        let (selector, position) = lump.select();
        let index = match selector {
            IndexSelector::Primary => Some(&self.primary),
            IndexSelector::Auxiliary => self.auxiliary.as_ref().map(|slot| &slot.index),
        };

        index
            .and_then(|index| index.get(position))
            .ok_or(VfsError::InvalidLumpNum(lump))
    }

    /// Entry record of a lump
    pub fn lump_info(&self, lump: LumpNum) -> Result<Arc<EntryInfo>> {
        self.entry(lump).cloned()
    }

    /// Container holding a lump
    pub fn lump_container(&self, lump: LumpNum) -> Result<&MountedFile> {
        let entry = self.entry(lump)?;
        self.container(entry.container)
            .ok_or(VfsError::InvalidLumpNum(lump))
    }

    /// Name of a lump
    pub fn lump_name(&self, lump: LumpNum) -> Result<&str> {
        self.entry(lump).map(|entry| entry.name.as_str())
    }

    /// Uncompressed size of a lump
    pub fn lump_length(&self, lump: LumpNum) -> Result<usize> {
        self.entry(lump).map(|entry| entry.size)
    }

    /// Modification time of a lump, Unix seconds
    pub fn lump_last_modified(&self, lump: LumpNum) -> Result<i64> {
        self.entry(lump).map(|entry| entry.last_modified)
    }

    /// Path of the container holding a lump
    pub fn lump_source_file(&self, lump: LumpNum) -> Result<&str> {
        self.lump_container(lump).map(|file| file.path())
    }

    /// Check if a lump comes from a custom (non-original) file
    pub fn lump_is_custom(&self, lump: LumpNum) -> Result<bool> {
        self.lump_container(lump).map(|file| file.core().is_custom())
    }

    /// Number of lumps in the primary index
    pub fn lump_count(&self) -> usize {
        self.primary.len()
    }

    /// Read part of a lump, from the cache when possible
    pub fn read_lump_section(
        &self,
        lump: LumpNum,
        buf: &mut [u8],
        start: usize,
        length: usize,
    ) -> Result<usize> {
        let entry = self.entry(lump)?;
        self.lump_container(lump)?
            .read_lump_section(entry.local_index, buf, start, length, true)
    }

    /// Read a whole lump
    pub fn read_lump(&self, lump: LumpNum, buf: &mut [u8]) -> Result<usize> {
        let entry = self.entry(lump)?;
        self.lump_container(lump)?.read_lump(entry.local_index, buf)
    }

    /// Cache a whole lump and return the shared buffer
    pub fn cache_lump(&mut self, lump: LumpNum, tag: CacheTag) -> Result<Arc<[u8]>> {
        let (file, local_index) = self.lump_container_mut(lump)?;
        file.cache_lump(local_index, tag)
    }

    /// Change the tag of a cached lump; `false` if it is not cached
    pub fn change_lump_cache_tag(&mut self, lump: LumpNum, tag: CacheTag) -> Result<bool> {
        let (file, local_index) = self.lump_container_mut(lump)?;
        Ok(file.change_lump_cache_tag(local_index, tag))
    }

    /// Release a cached lump; `false` if it was not cached
    pub fn unlock_lump(&mut self, lump: LumpNum) -> Result<bool> {
        let (file, local_index) = self.lump_container_mut(lump)?;
        Ok(file.unlock_lump(local_index))
    }

    /// Release every cached lump tagged `up_to` or shorter-lived, across all
    /// open containers. Returns the number released.
    pub fn purge_cache(&mut self, up_to: CacheTag) -> usize {
        let released: usize = self
            .open_files
            .iter_mut()
            .map(|file| file.purge_lump_cache(up_to))
            .sum();
        debug!("Purged {} cached lumps up to {}", released, up_to);
        released
    }

    fn lump_container_mut(&mut self, lump: LumpNum) -> Result<(&mut MountedFile, usize)> {
        let (container, local_index) = {
            let entry = self.entry(lump)?;
            (entry.container, entry.local_index)
        };
        let file = self
            .container_mut(container)
            .ok_or(VfsError::InvalidLumpNum(lump))?;
        Ok((file, local_index))
    }

    // Containers and indexes

    /// Loaded files in load order; the auxiliary is not included
    pub fn loaded_files(&self) -> impl Iterator<Item = &MountedFile> {
        self.loaded_files.iter().filter_map(|&id| self.container(id))
    }

    /// Number of open containers, auxiliary included
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }

    /// Container by id
    pub fn container(&self, id: ContainerId) -> Option<&MountedFile> {
        self.open_files.iter().find(|file| file.id() == id)
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut MountedFile> {
        self.open_files.iter_mut().find(|file| file.id() == id)
    }

    /// Primary lump index
    pub fn primary_index(&self) -> &LumpIndex {
        &self.primary
    }

    /// Index of Zip entries by absolute path
    pub fn zip_index(&self) -> &LumpIndex {
        &self.zip_index
    }

    /// Auxiliary lump index, if open
    pub fn auxiliary_index(&self) -> Option<&LumpIndex> {
        self.auxiliary.as_ref().map(|slot| &slot.index)
    }

    fn position_of(&self, id: ContainerId) -> Option<usize> {
        self.open_files.iter().position(|file| file.id() == id)
    }

    fn find_loaded(&self, path: &str) -> Option<ContainerId> {
        let absolute = self.make_absolute(path);
        let key = path::lookup_key(&absolute);

        let by_path = self.loaded_files.iter().rev().copied().find(|&id| {
            self.container(id)
                .is_some_and(|file| path::lookup_key(file.path()) == key)
        });
        if by_path.is_some() {
            return by_path;
        }

        // Fall back to the identity of the real file the path names
        let native = self
            .real_file_candidates(&absolute)
            .into_iter()
            .find(|candidate| Path::new(candidate).is_file())?;
        let identity = FileId::from_real_path(Path::new(&native));
        self.loaded_files.iter().rev().copied().find(|&id| {
            self.container(id)
                .is_some_and(|file| file.core().file_id() == Some(identity))
        })
    }

    fn make_absolute(&self, path: &str) -> String {
        path::make_absolute(path, &self.base)
    }

    fn allocate_id(&mut self) -> ContainerId {
        let id = ContainerId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn resolve_mappings(config: &VfsConfig, base: &str) -> Vec<VirtualDirectoryMapping> {
        config
            .virtual_directory_mappings
            .iter()
            .map(|mapping| mapping.resolved(base))
            .collect()
    }
}

/// Whether mounting or unmounting `file` can change the lump-directory
/// mappings
fn holds_lump_directory(file: &MountedFile) -> bool {
    file.kind() != ContainerKind::Zip
        && file
            .core()
            .entries()
            .iter()
            .any(|entry| entry.name.eq_ignore_ascii_case(LUMP_DIRECTORY_LUMP))
}

fn modified_time(native: &Path) -> i64 {
    std::fs::metadata(native)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}
