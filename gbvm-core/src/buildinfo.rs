// gbvm-core/src/buildinfo.rs
// Reads the build information the Go toolchain embeds in executables.

use std::fs;
use std::path::Path;

use gbvm_common::error::{GbvmError, Result};
use object::read::macho::{FatArch, MachOFatFile32, MachOFatFile64};
use object::{FileKind, Object, ObjectSection, SectionKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BUILDINFO_MAGIC: &[u8] = b"\xff Go buildinf:";
const BUILDINFO_ALIGN: usize = 16;
const BUILDINFO_HEADER_SIZE: usize = 32;
const FLAG_BIG_ENDIAN: u8 = 0x1;
const FLAG_INLINE_STRINGS: u8 = 0x2;
const MODINFO_SENTINEL_LEN: usize = 16;

const BUILDINFO_SECTION_NAMES: [&str; 2] = [".go.buildinfo", "__go_buildinfo"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub path: String,
    pub version: String,
    pub sum: Option<String>,
    pub replace: Option<Box<Module>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Toolchain that built the binary, e.g. `go1.22.1`.
    pub go_version: String,
    /// Package path of the main package.
    pub path: String,
    pub main: Module,
    pub deps: Vec<Module>,
    /// `build` lines: flags, VCS stamps, GOOS/GOARCH.
    pub settings: Vec<(String, String)>,
}

/// Opens `path` as an executable and decodes its embedded build information.
pub fn read_build_info(path: &Path) -> Result<BuildInfo> {
    debug!("Reading build info from {}", path.display());
    let data = fs::read(path)?;
    parse_build_info(&data)
        .map_err(|reason| GbvmError::not_a_build_artifact(path, reason))
}

/// Decodes build information from the bytes of an executable.
pub fn parse_build_info(data: &[u8]) -> std::result::Result<BuildInfo, String> {
    let kind = FileKind::parse(data).map_err(|_| "unrecognized file format".to_string())?;
    match kind {
        FileKind::Elf32
        | FileKind::Elf64
        | FileKind::MachO32
        | FileKind::MachO64
        | FileKind::Pe32
        | FileKind::Pe64 => {
            let file = object::File::parse(data).map_err(|e| e.to_string())?;
            read_from_object(&file)
        }
        // Universal binaries carry the same module info in every slice.
        FileKind::MachOFat32 => {
            let fat = MachOFatFile32::parse(data).map_err(|e| e.to_string())?;
            let arch = fat
                .arches()
                .first()
                .ok_or_else(|| "fat binary has no architectures".to_string())?;
            parse_build_info(fat_slice(data, arch.file_range())?)
        }
        FileKind::MachOFat64 => {
            let fat = MachOFatFile64::parse(data).map_err(|e| e.to_string())?;
            let arch = fat
                .arches()
                .first()
                .ok_or_else(|| "fat binary has no architectures".to_string())?;
            parse_build_info(fat_slice(data, arch.file_range())?)
        }
        other => Err(format!("unsupported file kind {other:?}")),
    }
}

fn fat_slice(data: &[u8], (offset, size): (u64, u64)) -> std::result::Result<&[u8], String> {
    let start = usize::try_from(offset).map_err(|e| e.to_string())?;
    let len = usize::try_from(size).map_err(|e| e.to_string())?;
    data.get(start..start.saturating_add(len))
        .ok_or_else(|| "fat architecture slice is out of bounds".to_string())
}

fn read_from_object(file: &object::File<'_>) -> std::result::Result<BuildInfo, String> {
    let blob = find_buildinfo_blob(file).ok_or_else(|| "no Go build info found".to_string())?;
    let (go_version, modinfo) = decode_blob(blob, |addr, size| read_at(file, addr, size))?;
    if go_version.is_empty() {
        return Err("not a Go executable".to_string());
    }
    parse_modinfo(&go_version, &strip_sentinels(&modinfo))
}

/// The blob lives in a dedicated section on recent toolchains; older ones
/// only place it somewhere in the writable data, 16-byte aligned.
fn find_buildinfo_blob<'data>(file: &object::File<'data>) -> Option<&'data [u8]> {
    for name in BUILDINFO_SECTION_NAMES {
        if let Some(section) = file.section_by_name(name) {
            if let Some(blob) = section.data().ok().and_then(find_magic) {
                debug!("Found build info in section {}", name);
                return Some(blob);
            }
        }
    }

    file.sections()
        .filter(|section| section.kind() == SectionKind::Data)
        .find_map(|section| section.data().ok().and_then(find_magic))
}

fn find_magic(data: &[u8]) -> Option<&[u8]> {
    (0..data.len())
        .step_by(BUILDINFO_ALIGN)
        .find(|&offset| data[offset..].starts_with(BUILDINFO_MAGIC))
        .map(|offset| &data[offset..])
}

fn read_at<'data>(file: &object::File<'data>, addr: u64, size: usize) -> Option<&'data [u8]> {
    let end = addr.checked_add(size as u64)?;
    file.sections().find_map(|section| {
        let start = section.address();
        if addr < start || end > start.saturating_add(section.size()) {
            return None;
        }
        let offset = usize::try_from(addr - start).ok()?;
        section.data().ok()?.get(offset..offset.checked_add(size)?)
    })
}

/// Splits the header into the Go version and raw module info strings.
///
/// `read_at` resolves virtual addresses for the pointer-based layout used
/// before Go 1.18.
fn decode_blob<'a, F>(blob: &[u8], read_at: F) -> std::result::Result<(String, Vec<u8>), String>
where
    F: Fn(u64, usize) -> Option<&'a [u8]>,
{
    if blob.len() < BUILDINFO_HEADER_SIZE {
        return Err("truncated build info header".to_string());
    }
    let ptr_size = blob[14] as usize;
    let flags = blob[15];

    if flags & FLAG_INLINE_STRINGS != 0 {
        let rest = &blob[BUILDINFO_HEADER_SIZE..];
        let (version, rest) = read_varint_string(rest)?;
        let (modinfo, _) = read_varint_string(rest)?;
        return Ok((String::from_utf8_lossy(version).into_owned(), modinfo.to_vec()));
    }

    if ptr_size != 4 && ptr_size != 8 {
        return Err(format!("invalid pointer size {ptr_size}"));
    }
    let big_endian = flags & FLAG_BIG_ENDIAN != 0;
    let word = |bytes: &[u8]| read_word(bytes, ptr_size, big_endian);

    let version_ptr = word(&blob[16..])?;
    let modinfo_ptr = word(&blob[16 + ptr_size..])?;
    let read_string = |ptr: u64| -> std::result::Result<Vec<u8>, String> {
        let header = read_at(ptr, 2 * ptr_size)
            .ok_or_else(|| format!("string header at {ptr:#x} is not mapped"))?;
        let data_ptr = word(header)?;
        let len = usize::try_from(word(&header[ptr_size..])?).map_err(|e| e.to_string())?;
        if len == 0 {
            return Ok(Vec::new());
        }
        read_at(data_ptr, len)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| format!("string data at {data_ptr:#x} is not mapped"))
    };

    let version = read_string(version_ptr)?;
    let modinfo = read_string(modinfo_ptr)?;
    Ok((String::from_utf8_lossy(&version).into_owned(), modinfo))
}

fn read_word(bytes: &[u8], ptr_size: usize, big_endian: bool) -> std::result::Result<u64, String> {
    let raw = bytes
        .get(..ptr_size)
        .ok_or_else(|| "truncated pointer".to_string())?;
    let mut buf = [0u8; 8];
    if big_endian {
        buf[8 - ptr_size..].copy_from_slice(raw);
        Ok(u64::from_be_bytes(buf))
    } else {
        buf[..ptr_size].copy_from_slice(raw);
        Ok(u64::from_le_bytes(buf))
    }
}

fn read_uvarint(data: &[u8]) -> std::result::Result<(u64, usize), String> {
    let mut value = 0u64;
    for (i, byte) in data.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err("invalid varint in build info".to_string())
}

fn read_varint_string(data: &[u8]) -> std::result::Result<(&[u8], &[u8]), String> {
    let (len, consumed) = read_uvarint(data)?;
    let len = usize::try_from(len).map_err(|e| e.to_string())?;
    let end = consumed
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| "build info string overruns its section".to_string())?;
    Ok((&data[consumed..end], &data[end..]))
}

// The linker frames module info with 16 bytes of sentinel on each side.
fn strip_sentinels(modinfo: &[u8]) -> String {
    let len = modinfo.len();
    if len >= 2 * MODINFO_SENTINEL_LEN + 1 && modinfo[len - MODINFO_SENTINEL_LEN - 1] == b'\n' {
        String::from_utf8_lossy(&modinfo[MODINFO_SENTINEL_LEN..len - MODINFO_SENTINEL_LEN])
            .into_owned()
    } else {
        String::new()
    }
}

fn parse_module(fields: &[&str]) -> Option<Module> {
    let path = fields.first().filter(|p| !p.is_empty())?;
    Some(Module {
        path: path.to_string(),
        version: fields.get(1).map(|v| v.to_string()).unwrap_or_default(),
        sum: fields
            .get(2)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        replace: None,
    })
}

/// Parses the tab-separated module info text.
pub fn parse_modinfo(go_version: &str, text: &str) -> std::result::Result<BuildInfo, String> {
    let mut path = None;
    let mut main: Option<Module> = None;
    let mut deps: Vec<Module> = Vec::new();
    let mut settings = Vec::new();
    // Whether the last module line was `mod` (true) or `dep` (false).
    let mut last_was_main = false;

    for line in text.lines() {
        let mut parts = line.splitn(2, '\t');
        let key = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        let fields: Vec<&str> = rest.split('\t').collect();

        match key {
            "path" => path = Some(rest.to_string()),
            "mod" => {
                main = parse_module(&fields);
                last_was_main = true;
            }
            "dep" => {
                if let Some(dep) = parse_module(&fields) {
                    deps.push(dep);
                }
                last_was_main = false;
            }
            "=>" => {
                let target = if last_was_main {
                    main.as_mut()
                } else {
                    deps.last_mut()
                };
                if let (Some(module), Some(replacement)) = (target, parse_module(&fields)) {
                    module.replace = Some(Box::new(replacement));
                }
            }
            "build" => {
                if let Some((k, v)) = rest.split_once('=') {
                    settings.push((k.to_string(), v.trim_matches('"').to_string()));
                }
            }
            _ => {}
        }
    }

    let path = path.ok_or_else(|| "no main package path in build info".to_string())?;
    let main = main.ok_or_else(|| "no module information (not built in module mode)".to_string())?;
    Ok(BuildInfo {
        go_version: go_version.to_string(),
        path,
        main,
        deps,
        settings,
    })
}
