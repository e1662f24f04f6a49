//! Migration Center source objects
//!
//! Typed mirrors of the REST resources exported by mc2bq. Each type
//! deserializes from the API's camelCase JSON and exposes its columns to the
//! normalizer through an explicit [`SourceObject`](crate::schema::SourceObject)
//! accessor keyed by the snake case column names of the table schema.

mod asset;
mod group;
mod preference_set;
mod types;

pub use asset::{
    Asset, AssetPerformanceData, DailyResourceUsageAggregation, Date, DiskEntry, DiskEntryList,
    FitDescriptor, FitLevel, GenericInsight, GuestConfigDetails, GuestOsDetails, Insight,
    InsightList, MachineDetails, MachineDiskDetails, MigrationInsight, OperatingSystemFamily,
    PowerState, ResourceUsage, Selinux, UsageStats,
};
pub use group::Group;
pub(crate) use types::int64;
pub use preference_set::{
    CommitmentPlan, ComputeMigrationTargetProduct, PreferenceSet, RegionPreferences,
    SizingOptimizationStrategy, VirtualMachinePreferences,
};
