//! Positional argument binding for compiled predicates
//!
//! The expression is re-scanned left to right (OR-groups outer, AND-terms
//! inner); each *distinct* property name takes the next unused argument
//! slot on first encounter, so a property repeated anywhere in the
//! expression reuses its earlier binding. Arguments beyond the distinct
//! property count are ignored.

use quarry_core::{DnfExpr, ExecutionError, Value};
use rustc_hash::FxHashMap;

/// Bind query arguments to the distinct properties of `expr`.
///
/// Returns property name → bound value. `method` names the call for error
/// context.
///
/// # Errors
///
/// Fails with [`ExecutionError::NotEnoughArguments`] when fewer arguments
/// are supplied than the expression binds.
pub fn bind_arguments<'e, 'a>(
    expr: &'e DnfExpr,
    args: &'a [Value],
    method: &str,
) -> Result<FxHashMap<&'e str, &'a Value>, ExecutionError> {
    let properties = expr.distinct_properties();
    if args.len() < properties.len() {
        return Err(ExecutionError::NotEnoughArguments {
            method: method.to_string(),
            expected: properties.len(),
            supplied: args.len(),
        });
    }

    Ok(properties.into_iter().zip(args.iter()).collect())
}
