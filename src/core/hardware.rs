//! Hardware inventory collection via WMI.
//!
//! Snapshots the machine's hardware identity (system, OS, BIOS, baseboard,
//! CPUs, memory, disks, GPUs, physical network adapters) with one CIM query
//! per class. The profile shape is fixed: values WMI does not supply stay
//! `None` and serialize as `null`, never as zero or an empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::error::Result;

/// Bytes per binary gibibyte.
const GIB: f64 = 1_073_741_824.0;

/// Complete hardware snapshot embedded in the report document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HardwareProfile {
    pub system: SystemInfo,
    pub os: OsInfo,
    pub bios: BiosInfo,
    pub baseboard: BaseboardInfo,
    pub cpus: Vec<CpuInfo>,
    pub memory_modules: Vec<MemoryModuleInfo>,
    pub disks: Vec<DiskInfo>,
    pub gpus: Vec<GpuInfo>,
    pub network_adapters: Vec<NetworkAdapterInfo>,
}

/// Machine identity from `Win32_ComputerSystem` and `Win32_SystemEnclosure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// SMBIOS chassis type mapped to a display label (e.g. `"Laptop"`).
    pub chassis_type: Option<String>,
    pub total_memory_gb: Option<f64>,
}

/// Operating system details from `Win32_OperatingSystem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsInfo {
    pub caption: Option<String>,
    pub version: Option<String>,
    pub build_number: Option<String>,
    pub install_date: Option<DateTime<Utc>>,
    pub last_boot_time: Option<DateTime<Utc>>,
    pub architecture: Option<String>,
}

/// Firmware details from `Win32_BIOS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BiosInfo {
    pub manufacturer: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub serial_number: Option<String>,
}

/// Motherboard details from `Win32_BaseBoard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseboardInfo {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub version: Option<String>,
}

/// One processor package from `Win32_Processor`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CpuInfo {
    pub name: Option<String>,
    pub cores: Option<u32>,
    pub logical_processors: Option<u32>,
    pub max_clock_mhz: Option<u32>,
}

/// One DIMM from `Win32_PhysicalMemory`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryModuleInfo {
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
    pub capacity_gb: Option<f64>,
    pub speed_mhz: Option<u32>,
}

/// One physical drive from `Win32_DiskDrive`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiskInfo {
    pub model: Option<String>,
    pub interface_type: Option<String>,
    pub size_gb: Option<f64>,
    pub serial_number: Option<String>,
}

/// One display adapter from `Win32_VideoController`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GpuInfo {
    pub name: Option<String>,
    pub driver_version: Option<String>,
    pub vram_gb: Option<f64>,
}

/// One physical, enabled adapter from `Win32_NetworkAdapter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAdapterInfo {
    pub name: Option<String>,
    pub mac_address: Option<String>,
    pub link_speed_mbps: Option<u64>,
}

/// Convert a byte count to binary gibibytes, rounded to 2 decimal places.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    (bytes as f64 / GIB * 100.0).round() / 100.0
}

/// Convert a link speed in bits per second to whole megabits per second.
pub fn bits_to_mbps(bits_per_sec: u64) -> u64 {
    bits_per_sec / 1_000_000
}

/// Map an SMBIOS chassis type code (`Win32_SystemEnclosure.ChassisTypes`)
/// to its display label.
pub fn chassis_type_label(code: u16) -> &'static str {
    match code {
        1 => "Other",
        3 => "Desktop",
        4 => "Low Profile Desktop",
        5 => "Pizza Box",
        6 => "Mini Tower",
        7 => "Tower",
        8 => "Portable",
        9 => "Laptop",
        10 => "Notebook",
        11 => "Hand Held",
        12 => "Docking Station",
        13 => "All in One",
        14 => "Sub Notebook",
        15 => "Space-saving",
        16 => "Lunch Box",
        17 => "Main Server Chassis",
        18 => "Expansion Chassis",
        19 => "SubChassis",
        20 => "Bus Expansion Chassis",
        21 => "Peripheral Chassis",
        22 => "RAID Chassis",
        23 => "Rack Mount Chassis",
        24 => "Sealed-case PC",
        30 => "Tablet",
        31 => "Convertible",
        32 => "Detachable",
        35 => "Mini PC",
        36 => "Stick PC",
        _ => "Unknown",
    }
}

#[cfg(windows)]
mod wmi_rows {
    //! Row shapes for the CIM classes the inventory queries. Property names
    //! must match WMI's exactly, so the irregular ones carry explicit
    //! renames.

    use serde::Deserialize;
    use wmi::WMIDateTime;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct ComputerSystem {
        pub manufacturer: Option<String>,
        pub model: Option<String>,
        pub total_physical_memory: Option<u64>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct SystemEnclosure {
        pub chassis_types: Option<Vec<u16>>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct OperatingSystem {
        pub caption: Option<String>,
        pub version: Option<String>,
        pub build_number: Option<String>,
        pub install_date: Option<WMIDateTime>,
        pub last_boot_up_time: Option<WMIDateTime>,
        #[serde(rename = "OSArchitecture")]
        pub os_architecture: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct Bios {
        pub manufacturer: Option<String>,
        #[serde(rename = "SMBIOSBIOSVersion")]
        pub smbios_bios_version: Option<String>,
        pub release_date: Option<WMIDateTime>,
        pub serial_number: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct BaseBoard {
        pub manufacturer: Option<String>,
        pub product: Option<String>,
        pub serial_number: Option<String>,
        pub version: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct Processor {
        pub name: Option<String>,
        pub number_of_cores: Option<u32>,
        pub number_of_logical_processors: Option<u32>,
        pub max_clock_speed: Option<u32>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct PhysicalMemory {
        pub manufacturer: Option<String>,
        pub part_number: Option<String>,
        pub capacity: Option<u64>,
        pub speed: Option<u32>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct DiskDrive {
        pub model: Option<String>,
        pub interface_type: Option<String>,
        pub size: Option<u64>,
        pub serial_number: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct VideoController {
        pub name: Option<String>,
        pub driver_version: Option<String>,
        #[serde(rename = "AdapterRAM")]
        pub adapter_ram: Option<u32>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct NetworkAdapter {
        pub name: Option<String>,
        #[serde(rename = "MACAddress")]
        pub mac_address: Option<String>,
        pub speed: Option<u64>,
    }
}

/// Collect the full hardware profile from the local CIM repository.
///
/// Any query failure is fatal to the run: the profile is the report's
/// identity block, and a report that cannot say what machine it describes
/// is not worth producing.
#[cfg(windows)]
pub fn collect_hardware() -> Result<HardwareProfile> {
    use wmi::{COMLibrary, WMIConnection};

    use self::wmi_rows::*;

    let com = COMLibrary::new()?;
    let wmi = WMIConnection::new(com)?;

    let mut profile = HardwareProfile::default();

    let systems: Vec<ComputerSystem> = wmi.raw_query(
        "SELECT Manufacturer, Model, TotalPhysicalMemory FROM Win32_ComputerSystem",
    )?;
    if let Some(cs) = systems.into_iter().next() {
        profile.system.manufacturer = cs.manufacturer;
        profile.system.model = cs.model;
        profile.system.total_memory_gb = cs.total_physical_memory.map(bytes_to_gib);
    }

    let enclosures: Vec<SystemEnclosure> =
        wmi.raw_query("SELECT ChassisTypes FROM Win32_SystemEnclosure")?;
    profile.system.chassis_type = enclosures
        .into_iter()
        .next()
        .and_then(|e| e.chassis_types)
        .and_then(|codes| codes.first().copied())
        .map(|code| chassis_type_label(code).to_string());

    let oses: Vec<OperatingSystem> = wmi.raw_query(
        "SELECT Caption, Version, BuildNumber, InstallDate, LastBootUpTime, OSArchitecture \
         FROM Win32_OperatingSystem",
    )?;
    if let Some(os) = oses.into_iter().next() {
        profile.os.caption = os.caption;
        profile.os.version = os.version;
        profile.os.build_number = os.build_number;
        profile.os.install_date = os.install_date.map(|d| d.0.with_timezone(&Utc));
        profile.os.last_boot_time = os.last_boot_up_time.map(|d| d.0.with_timezone(&Utc));
        profile.os.architecture = os.os_architecture;
    }

    let bioses: Vec<Bios> = wmi.raw_query(
        "SELECT Manufacturer, SMBIOSBIOSVersion, ReleaseDate, SerialNumber FROM Win32_BIOS",
    )?;
    if let Some(bios) = bioses.into_iter().next() {
        profile.bios.manufacturer = bios.manufacturer;
        profile.bios.version = bios.smbios_bios_version;
        profile.bios.release_date = bios.release_date.map(|d| d.0.with_timezone(&Utc));
        profile.bios.serial_number = bios.serial_number;
    }

    let boards: Vec<BaseBoard> = wmi.raw_query(
        "SELECT Manufacturer, Product, SerialNumber, Version FROM Win32_BaseBoard",
    )?;
    if let Some(board) = boards.into_iter().next() {
        profile.baseboard.manufacturer = board.manufacturer;
        profile.baseboard.product = board.product;
        profile.baseboard.serial_number = board.serial_number;
        profile.baseboard.version = board.version;
    }

    let processors: Vec<Processor> = wmi.raw_query(
        "SELECT Name, NumberOfCores, NumberOfLogicalProcessors, MaxClockSpeed \
         FROM Win32_Processor",
    )?;
    profile.cpus = processors
        .into_iter()
        .map(|p| CpuInfo {
            name: p.name.map(|n| n.trim().to_string()),
            cores: p.number_of_cores,
            logical_processors: p.number_of_logical_processors,
            max_clock_mhz: p.max_clock_speed,
        })
        .collect();

    let modules: Vec<PhysicalMemory> = wmi.raw_query(
        "SELECT Manufacturer, PartNumber, Capacity, Speed FROM Win32_PhysicalMemory",
    )?;
    profile.memory_modules = modules
        .into_iter()
        .map(|m| MemoryModuleInfo {
            manufacturer: m.manufacturer.map(|s| s.trim().to_string()),
            part_number: m.part_number.map(|s| s.trim().to_string()),
            capacity_gb: m.capacity.map(bytes_to_gib),
            speed_mhz: m.speed,
        })
        .collect();

    let drives: Vec<DiskDrive> = wmi.raw_query(
        "SELECT Model, InterfaceType, Size, SerialNumber FROM Win32_DiskDrive",
    )?;
    profile.disks = drives
        .into_iter()
        .map(|d| DiskInfo {
            model: d.model,
            interface_type: d.interface_type,
            size_gb: d.size.map(bytes_to_gib),
            serial_number: d.serial_number.map(|s| s.trim().to_string()),
        })
        .collect();

    let gpus: Vec<VideoController> = wmi.raw_query(
        "SELECT Name, DriverVersion, AdapterRAM FROM Win32_VideoController",
    )?;
    profile.gpus = gpus
        .into_iter()
        .map(|g| GpuInfo {
            name: g.name,
            driver_version: g.driver_version,
            vram_gb: g.adapter_ram.map(|ram| bytes_to_gib(ram as u64)),
        })
        .collect();

    // Virtual and disconnected adapters are excluded by the WHERE clause,
    // not post-filtered, so WMI never hands them back at all.
    let adapters: Vec<NetworkAdapter> = wmi.raw_query(
        "SELECT Name, MACAddress, Speed FROM Win32_NetworkAdapter \
         WHERE PhysicalAdapter=TRUE AND NetEnabled=TRUE",
    )?;
    profile.network_adapters = adapters
        .into_iter()
        .map(|a| NetworkAdapterInfo {
            name: a.name,
            mac_address: a.mac_address,
            link_speed_mbps: a.speed.map(bits_to_mbps),
        })
        .collect();

    tracing::info!(
        "Hardware inventory: {} CPU(s), {} memory module(s), {} disk(s), {} GPU(s), {} adapter(s)",
        profile.cpus.len(),
        profile.memory_modules.len(),
        profile.disks.len(),
        profile.gpus.len(),
        profile.network_adapters.len()
    );
    Ok(profile)
}

/// Hardware inventory needs the local WMI/CIM repository.
#[cfg(not(windows))]
pub fn collect_hardware() -> Result<HardwareProfile> {
    use crate::util::error::BlueBoxError;

    Err(BlueBoxError::Unsupported("hardware inventory via WMI".into()))
}
