//! Resolving objects and object parts into affordance records.

use crate::dataset::Dataset;
use crate::model::affordance::Affordance;
use crate::model::hydration::Hydration;
use crate::{zlog_trace, Error, Result};

impl Dataset {
    /// Assemble the affordance record of an object or part.
    ///
    /// The name comes from the object descriptions, falling back to the part
    /// descriptions. Ids missing from the part tree are treated as leaves.
    pub fn load_affordance(&mut self, obj_id: &str, instantiated: bool) -> Result<Affordance> {
        let obj_name = self
            .obj_desc
            .get(obj_id)
            .or_else(|| self.part_desc.get(obj_id))
            .map(|d| d.obj_name.clone())
            .ok_or_else(|| Error::ObjectNotFound(obj_id.to_string()))?;
        let labels = self
            .object_affordance
            .get(obj_id)
            .ok_or_else(|| Error::MissingEntry {
                kind: "object affordance",
                key: obj_id.to_string(),
            })?;

        let mut affordance = Affordance {
            obj_id: obj_id.to_string(),
            obj_name,
            has_model: labels.has_model,
            obj_instance_id: self.part_tree.root_of(obj_id).to_string(),
            obj_part_id: self
                .part_tree
                .children_of(obj_id)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            affordance_list: labels.affordance.clone(),
            affordance_instantiation_list: labels.affordance_instantiation.clone(),
            state: Hydration::Unhydrated,
        };
        zlog_trace!(
            "load_affordance id={} instance={} parts={}",
            obj_id,
            affordance.obj_instance_id,
            affordance.obj_part_id.len()
        );

        if instantiated {
            self.instantiate_affordance(&mut affordance)?;
        }
        Ok(affordance)
    }

    /// Expand an affordance into its parts.
    ///
    /// A leaf part yields itself (hydrated when `instantiated`); otherwise
    /// each constituent part id is loaded as a fresh record.
    pub fn load_affordance_part(
        &mut self,
        mut affordance: Affordance,
        instantiated: bool,
    ) -> Result<Vec<Affordance>> {
        if affordance.is_part() {
            if instantiated {
                self.instantiate_affordance(&mut affordance)?;
            }
            return Ok(vec![affordance]);
        }
        affordance
            .obj_part_id
            .iter()
            .map(|part_id| self.load_affordance(part_id, instantiated))
            .collect()
    }
}
