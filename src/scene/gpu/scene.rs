use super::super::cpu::scene::UmbraDrawRef;
use super::mesh::UmbraGpuPrimitive;
use super::material::UmbraResolvedMaterial;

/// One binding-table entry. The draw reference records which node, mesh and
/// primitive this entry came from so the render loop can verify it walks the
/// same order the binder produced.
pub struct UmbraBindingEntry {
  pub draw_ref: UmbraDrawRef,
  pub geometry: UmbraGpuPrimitive,
  pub material: UmbraResolvedMaterial,
}

/// The GPU binding table of a scene: one entry per drawable primitive, in
/// canonical draw order.
pub struct UmbraBindingTable {
  pub entries: Vec<UmbraBindingEntry>,
}

/// The Drop implementation of the binding table.
impl Drop for UmbraBindingTable {
  fn drop(&mut self) {
    log::debug!("A UmbraBindingTable dropped.");
  }
}

/// The implementation of the binding table.
impl UmbraBindingTable {
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }
}
