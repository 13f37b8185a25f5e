//! This module locates and extracts the callback from the arguments of a call.

use crate::options::Options;
use js_sys::{Array, Function};
use wasm_bindgen::JsCast;

/// Where the callback of a call is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// The computed position. May be negative or past the effective argument
    /// count when the configuration does not fit the call.
    pub position: i64,
    /// Number of arguments the call is considered to have.
    pub effective_count: u32,
}

impl Slot {
    /// Computes the callback slot for a call with `supplied` arguments to a
    /// function declaring `declared` parameters.
    pub fn locate(supplied: u32, declared: u32, options: &Options) -> Self {
        let effective_count = if options.arity > 0 {
            options.arity
        } else if options.infer_arity_from_declaration {
            declared.saturating_add(1)
        } else {
            supplied
        };

        let position = if options.callback_index >= 0 {
            i64::from(options.callback_index)
        } else {
            i64::from(effective_count) + i64::from(options.callback_index)
        };

        Self { position, effective_count }
    }

    /// The position as an index, if it falls inside the effective argument
    /// list.
    pub fn index(&self) -> Option<u32> {
        u32::try_from(self.position)
            .ok()
            .filter(|&index| index < self.effective_count)
    }
}

/// Arguments of one call, split into the callback (if any) and the rest.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// Where the callback was looked for.
    pub slot: Slot,
    /// The callback, if the slot held a function.
    pub callback: Option<Function>,
    /// The arguments without the callback. Equal to the original arguments
    /// when there is no callback.
    pub rest: Array,
}

/// Splits `args` into the callback and the remaining arguments. A slot past
/// the supplied arguments reads as `undefined`, which is not a callback.
pub fn extract(args: &Array, declared: u32, options: &Options) -> Extracted {
    let slot = Slot::locate(args.length(), declared, options);

    let callback = slot
        .index()
        .filter(|&index| index < args.length())
        .and_then(|index| args.get(index).dyn_into::<Function>().ok());

    let rest = match (&callback, slot.index()) {
        (Some(_), Some(index)) => args
            .slice(0, index)
            .concat(&args.slice(index + 1, args.length())),
        _ => args.clone(),
    };

    Extracted { slot, callback, rest }
}

#[cfg(test)]
mod test {
    use super::Slot;
    use crate::options::{Options, Overrides};

    #[test]
    fn last_position_by_default() {
        let slot = Slot::locate(3, 0, &Options::default());
        assert_eq!(slot.effective_count, 3);
        assert_eq!(slot.index(), Some(2));
    }

    #[test]
    fn no_arguments_no_slot() {
        let slot = Slot::locate(0, 0, &Options::default());
        assert_eq!(slot.position, -1);
        assert_eq!(slot.index(), None);
    }

    #[test]
    fn fixed_arity_beyond_supplied() {
        let options = Overrides::new().arity(4).apply(Options::default());
        let slot = Slot::locate(1, 0, &options);
        assert_eq!(slot.effective_count, 4);
        assert_eq!(slot.index(), Some(3));
    }

    #[test]
    fn fixed_arity_shorter_than_supplied() {
        let options = Overrides::new().arity(2).apply(Options::default());
        let slot = Slot::locate(5, 0, &options);
        assert_eq!(slot.index(), Some(1));
    }

    #[test]
    fn callback_first() {
        let options = Overrides::new().callback_index(0).apply(Options::default());
        assert_eq!(Slot::locate(3, 0, &options).index(), Some(0));
        assert_eq!(Slot::locate(0, 0, &options).index(), None);
    }

    #[test]
    fn negative_index_counts_from_end() {
        let options =
            Overrides::new().callback_index(-2).apply(Options::default());
        assert_eq!(Slot::locate(3, 0, &options).index(), Some(1));
        assert_eq!(Slot::locate(1, 0, &options).index(), None);
    }

    #[test]
    fn declared_arity_inference() {
        let options = Overrides::new()
            .infer_arity_from_declaration(true)
            .apply(Options::default());
        let slot = Slot::locate(5, 2, &options);
        assert_eq!(slot.effective_count, 3);
        assert_eq!(slot.index(), Some(2));
    }

    #[test]
    fn positive_index_out_of_range() {
        let options = Overrides::new().callback_index(7).apply(Options::default());
        let slot = Slot::locate(2, 0, &options);
        assert_eq!(slot.position, 7);
        assert_eq!(slot.index(), None);
    }
}
