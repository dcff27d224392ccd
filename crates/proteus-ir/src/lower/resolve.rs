//! Dotted reference resolution.

use proteus_ast::Reference;
use tracing::trace;

use super::{FuncCtx, Lowerer};
use crate::{builtins, Constant, IrType, Value};

impl Lowerer {
    /// Resolve `a.b.c` to the value of its last slot.
    ///
    /// The first segment is emitted as an identifier (declaring it on first
    /// mention); every further segment becomes one `getSlot(cur, key, 1)`.
    /// With `ignore_last` the final lookup is skipped and the container is
    /// returned instead.
    pub(super) fn resolve_reference(
        &mut self,
        ctx: &mut FuncCtx,
        reference: &Reference,
        ignore_last: bool,
    ) -> Value {
        let segments = reference.segments();
        let mut current = self.emit_identifier(ctx, &reference.first().value);
        let last_index = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate().skip(1) {
            if ignore_last && i == last_index {
                break;
            }
            trace!(slot = %segment.value, "getSlot");
            let key = self.slot_key(&segment.value.name);
            current = self.emit_runtime_call(
                ctx,
                builtins::GET_SLOT,
                vec![current, key, Value::Const(Constant::I64(1))],
                IrType::Ptr,
            );
        }

        current
    }
}
