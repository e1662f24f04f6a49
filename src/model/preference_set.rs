//! Preference set resource

use crate::schema::{ProtoEnum, SourceObject, SourceValue, Timestamp};
use serde::{Deserialize, Serialize};

/// Migration target preferences used when generating reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceSet {
    pub name: String,
    pub create_time: Option<Timestamp>,
    pub update_time: Option<Timestamp>,
    pub display_name: String,
    pub description: String,
    pub virtual_machine_preferences: Option<VirtualMachinePreferences>,
}

impl SourceObject for PreferenceSet {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "name" => SourceValue::from(&self.name),
            "create_time" => self.create_time.into(),
            "update_time" => self.update_time.into(),
            "display_name" => SourceValue::from(&self.display_name),
            "description" => SourceValue::from(&self.description),
            "virtual_machine_preferences" => {
                SourceValue::optional_record(self.virtual_machine_preferences.as_ref())
            }
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachinePreferences {
    pub target_product: ComputeMigrationTargetProduct,
    pub commitment_plan: CommitmentPlan,
    pub sizing_optimization_strategy: SizingOptimizationStrategy,
    pub region_preferences: Option<RegionPreferences>,
}

impl SourceObject for VirtualMachinePreferences {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "target_product" => SourceValue::enumeration(&self.target_product),
            "commitment_plan" => SourceValue::enumeration(&self.commitment_plan),
            "sizing_optimization_strategy" => {
                SourceValue::enumeration(&self.sizing_optimization_strategy)
            }
            "region_preferences" => SourceValue::optional_record(self.region_preferences.as_ref()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionPreferences {
    pub preferred_regions: Vec<String>,
}

impl SourceObject for RegionPreferences {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        match column {
            "preferred_regions" => Some(SourceValue::list(&self.preferred_regions)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputeMigrationTargetProduct {
    ComputeMigrationTargetProductComputeEngine,
    ComputeMigrationTargetProductVmwareEngine,
    ComputeMigrationTargetProductSoleTenancy,
    #[default]
    #[serde(other)]
    ComputeMigrationTargetProductUnspecified,
}

impl ProtoEnum for ComputeMigrationTargetProduct {
    fn name(&self) -> &'static str {
        match self {
            Self::ComputeMigrationTargetProductUnspecified => {
                "COMPUTE_MIGRATION_TARGET_PRODUCT_UNSPECIFIED"
            }
            Self::ComputeMigrationTargetProductComputeEngine => {
                "COMPUTE_MIGRATION_TARGET_PRODUCT_COMPUTE_ENGINE"
            }
            Self::ComputeMigrationTargetProductVmwareEngine => {
                "COMPUTE_MIGRATION_TARGET_PRODUCT_VMWARE_ENGINE"
            }
            Self::ComputeMigrationTargetProductSoleTenancy => {
                "COMPUTE_MIGRATION_TARGET_PRODUCT_SOLE_TENANCY"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitmentPlan {
    CommitmentPlanNone,
    CommitmentPlanOneYear,
    CommitmentPlanThreeYears,
    #[default]
    #[serde(other)]
    CommitmentPlanUnspecified,
}

impl ProtoEnum for CommitmentPlan {
    fn name(&self) -> &'static str {
        match self {
            Self::CommitmentPlanUnspecified => "COMMITMENT_PLAN_UNSPECIFIED",
            Self::CommitmentPlanNone => "COMMITMENT_PLAN_NONE",
            Self::CommitmentPlanOneYear => "COMMITMENT_PLAN_ONE_YEAR",
            Self::CommitmentPlanThreeYears => "COMMITMENT_PLAN_THREE_YEARS",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingOptimizationStrategy {
    SizingOptimizationStrategySameAsSource,
    SizingOptimizationStrategyModerate,
    SizingOptimizationStrategyAggressive,
    #[default]
    #[serde(other)]
    SizingOptimizationStrategyUnspecified,
}

impl ProtoEnum for SizingOptimizationStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::SizingOptimizationStrategyUnspecified => {
                "SIZING_OPTIMIZATION_STRATEGY_UNSPECIFIED"
            }
            Self::SizingOptimizationStrategySameAsSource => {
                "SIZING_OPTIMIZATION_STRATEGY_SAME_AS_SOURCE"
            }
            Self::SizingOptimizationStrategyModerate => "SIZING_OPTIMIZATION_STRATEGY_MODERATE",
            Self::SizingOptimizationStrategyAggressive => {
                "SIZING_OPTIMIZATION_STRATEGY_AGGRESSIVE"
            }
        }
    }
}
