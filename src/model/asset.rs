//! Asset resource

use super::types::int64;
use crate::schema::{ProtoEnum, SourceObject, SourceValue, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A machine discovered by Migration Center
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Asset {
    pub name: String,
    pub create_time: Option<Timestamp>,
    pub update_time: Option<Timestamp>,
    pub labels: HashMap<String, String>,
    pub attributes: HashMap<String, String>,
    pub assigned_groups: Vec<String>,
    pub sources: Vec<String>,
    pub machine_details: Option<MachineDetails>,
    pub insight_list: Option<InsightList>,
    pub performance_data: Option<AssetPerformanceData>,
}

impl SourceObject for Asset {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "name" => SourceValue::from(&self.name),
            "create_time" => self.create_time.into(),
            "update_time" => self.update_time.into(),
            "labels" => SourceValue::map(&self.labels),
            "attributes" => SourceValue::map(&self.attributes),
            "assigned_groups" => SourceValue::list(&self.assigned_groups),
            "sources" => SourceValue::list(&self.sources),
            "machine_details" => SourceValue::optional_record(self.machine_details.as_ref()),
            "insight_list" => SourceValue::optional_record(self.insight_list.as_ref()),
            "performance_data" => SourceValue::optional_record(self.performance_data.as_ref()),
            _ => return None,
        })
    }
}

// ============================================================================
// Machine Details
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineDetails {
    pub uuid: String,
    pub machine_name: String,
    pub create_time: Option<Timestamp>,
    pub core_count: i32,
    pub memory_mb: i32,
    pub power_state: PowerState,
    pub guest_os: Option<GuestOsDetails>,
    pub disks: Option<MachineDiskDetails>,
}

impl SourceObject for MachineDetails {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "uuid" => SourceValue::from(&self.uuid),
            "machine_name" => SourceValue::from(&self.machine_name),
            "create_time" => self.create_time.into(),
            "core_count" => self.core_count.into(),
            "memory_mb" => self.memory_mb.into(),
            "power_state" => SourceValue::enumeration(&self.power_state),
            "guest_os" => SourceValue::optional_record(self.guest_os.as_ref()),
            "disks" => SourceValue::optional_record(self.disks.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    Pending,
    Active,
    Suspending,
    Suspended,
    Deleting,
    Deleted,
    #[default]
    #[serde(other)]
    PowerStateUnspecified,
}

impl ProtoEnum for PowerState {
    fn name(&self) -> &'static str {
        match self {
            PowerState::PowerStateUnspecified => "POWER_STATE_UNSPECIFIED",
            PowerState::Pending => "PENDING",
            PowerState::Active => "ACTIVE",
            PowerState::Suspending => "SUSPENDING",
            PowerState::Suspended => "SUSPENDED",
            PowerState::Deleting => "DELETING",
            PowerState::Deleted => "DELETED",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestOsDetails {
    pub os_name: String,
    pub family: OperatingSystemFamily,
    pub version: String,
    pub config: Option<GuestConfigDetails>,
}

impl SourceObject for GuestOsDetails {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "os_name" => SourceValue::from(&self.os_name),
            "family" => SourceValue::enumeration(&self.family),
            "version" => SourceValue::from(&self.version),
            "config" => SourceValue::optional_record(self.config.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingSystemFamily {
    OsFamilyWindows,
    OsFamilyLinux,
    OsFamilyUnix,
    #[default]
    #[serde(other)]
    OsFamilyUnknown,
}

impl ProtoEnum for OperatingSystemFamily {
    fn name(&self) -> &'static str {
        match self {
            OperatingSystemFamily::OsFamilyUnknown => "OS_FAMILY_UNKNOWN",
            OperatingSystemFamily::OsFamilyWindows => "OS_FAMILY_WINDOWS",
            OperatingSystemFamily::OsFamilyLinux => "OS_FAMILY_LINUX",
            OperatingSystemFamily::OsFamilyUnix => "OS_FAMILY_UNIX",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestConfigDetails {
    pub issue: String,
    pub selinux: Option<Selinux>,
}

impl SourceObject for GuestConfigDetails {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "issue" => SourceValue::from(&self.issue),
            "selinux" => SourceValue::optional_record(self.selinux.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selinux {
    pub enabled: bool,
    pub mode: String,
}

impl SourceObject for Selinux {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "enabled" => self.enabled.into(),
            "mode" => SourceValue::from(&self.mode),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineDiskDetails {
    #[serde(with = "int64")]
    pub total_capacity_bytes: i64,
    #[serde(with = "int64")]
    pub total_free_bytes: i64,
    pub disks: Option<DiskEntryList>,
}

impl SourceObject for MachineDiskDetails {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "total_capacity_bytes" => self.total_capacity_bytes.into(),
            "total_free_bytes" => self.total_free_bytes.into(),
            "disks" => SourceValue::optional_record(self.disks.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskEntryList {
    pub entries: Vec<DiskEntry>,
}

impl SourceObject for DiskEntryList {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "entries" => Some(SourceValue::records(&self.entries)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskEntry {
    #[serde(with = "int64")]
    pub capacity_bytes: i64,
    #[serde(with = "int64")]
    pub free_bytes: i64,
    pub disk_label: String,
    pub interface_type: String,
}

impl SourceObject for DiskEntry {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "capacity_bytes" => self.capacity_bytes.into(),
            "free_bytes" => self.free_bytes.into(),
            "disk_label" => SourceValue::from(&self.disk_label),
            "interface_type" => SourceValue::from(&self.interface_type),
            _ => return None,
        })
    }
}

// ============================================================================
// Insights
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightList {
    pub insights: Vec<Insight>,
    pub update_time: Option<Timestamp>,
}

impl SourceObject for InsightList {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "insights" => SourceValue::records(&self.insights),
            "update_time" => self.update_time.into(),
            _ => return None,
        })
    }
}

/// One insight. The API sets exactly one of the variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insight {
    pub migration_insight: Option<MigrationInsight>,
    pub generic_insight: Option<GenericInsight>,
}

impl SourceObject for Insight {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "migration_insight" => SourceValue::optional_record(self.migration_insight.as_ref()),
            "generic_insight" => SourceValue::optional_record(self.generic_insight.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationInsight {
    pub fit: Option<FitDescriptor>,
}

impl SourceObject for MigrationInsight {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "fit" => Some(SourceValue::optional_record(self.fit.as_ref())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitDescriptor {
    pub fit_level: FitLevel,
}

impl SourceObject for FitDescriptor {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "fit_level" => Some(SourceValue::enumeration(&self.fit_level)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitLevel {
    Fit,
    NoFit,
    RequiresEffort,
    #[default]
    #[serde(other)]
    FitLevelUnspecified,
}

impl ProtoEnum for FitLevel {
    fn name(&self) -> &'static str {
        match self {
            FitLevel::FitLevelUnspecified => "FIT_LEVEL_UNSPECIFIED",
            FitLevel::Fit => "FIT",
            FitLevel::NoFit => "NO_FIT",
            FitLevel::RequiresEffort => "REQUIRES_EFFORT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericInsight {
    #[serde(with = "int64")]
    pub message_id: i64,
    pub default_message: String,
    pub additional_information: Vec<String>,
}

impl SourceObject for GenericInsight {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "message_id" => self.message_id.into(),
            "default_message" => SourceValue::from(&self.default_message),
            "additional_information" => SourceValue::list(&self.additional_information),
            _ => return None,
        })
    }
}

// ============================================================================
// Performance Data
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetPerformanceData {
    pub daily_resource_usage_aggregations: Vec<DailyResourceUsageAggregation>,
}

impl SourceObject for AssetPerformanceData {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "daily_resource_usage_aggregations" => {
                Some(SourceValue::records(&self.daily_resource_usage_aggregations))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyResourceUsageAggregation {
    pub date: Option<Date>,
    pub cpu: Option<ResourceUsage>,
    pub memory: Option<ResourceUsage>,
}

impl SourceObject for DailyResourceUsageAggregation {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "date" => SourceValue::optional_record(self.date.as_ref()),
            "cpu" => SourceValue::optional_record(self.cpu.as_ref()),
            "memory" => SourceValue::optional_record(self.memory.as_ref()),
            _ => return None,
        })
    }
}

/// A calendar date without time zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Date {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl SourceObject for Date {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "year" => self.year.into(),
            "month" => self.month.into(),
            "day" => self.day.into(),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceUsage {
    pub utilization_percentage: Option<UsageStats>,
}

impl SourceObject for ResourceUsage {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "utilization_percentage" => {
                Some(SourceValue::optional_record(self.utilization_percentage.as_ref()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStats {
    pub average: f64,
    pub median: f64,
    pub ninety_fifth_percentile: f64,
    pub peak: f64,
}

impl SourceObject for UsageStats {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "average" => self.average.into(),
            "median" => self.median.into(),
            "ninety_fifth_percentile" => self.ninety_fifth_percentile.into(),
            "peak" => self.peak.into(),
            _ => return None,
        })
    }
}
