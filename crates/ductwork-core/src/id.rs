use slotmap::new_key_type;

new_key_type! {
    /// Identifies a discovered network in the manager's arena.
    pub struct NetworkId;
}
