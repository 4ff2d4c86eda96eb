/// Test utilities for picker tests
///
/// `TestPicker` builds a mounted picker with a fixed "today", a known viewport
/// and input placement, and records everything the picker reports through its
/// callbacks.
///
/// ## Usage Examples
///
/// ```rust
/// use crate::infrastructure::test_utils::test_harness::*;
///
/// #[test]
/// fn my_test() {
///     let mut harness = TestPicker::new(DateValue::empty(ValueKind::Single));
///     harness.open();
///     harness.picker.select_day(day(2024, 3, 20));
///     assert_eq!(harness.changes().len(), 1);
/// }
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::entities::{Bounds, DateValue, Viewport};
    use crate::infrastructure::ListenerRegistry;
    use crate::picker::{DatePicker, DatePickerOptions, PickerEvent};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    /// Friday, 15 March 2024
    pub fn test_today() -> NaiveDate {
        day(2024, 3, 15)
    }

    pub fn test_viewport() -> Viewport {
        Viewport::new(80, 24)
    }

    pub fn test_input_bounds() -> Bounds {
        Bounds::new(2, 5, 30, 3)
    }

    /// A mounted picker whose callbacks write into shared logs
    pub struct TestPicker {
        pub picker: DatePicker,
        pub registry: ListenerRegistry,
        changes: Rc<RefCell<Vec<DateValue>>>,
        rejected: Rc<RefCell<Vec<NaiveDate>>>,
    }

    impl TestPicker {
        pub fn new(value: DateValue) -> Self {
            Self::with_options(DatePickerOptions::new(value))
        }

        pub fn with_options(options: DatePickerOptions) -> Self {
            let changes = Rc::new(RefCell::new(Vec::new()));
            let rejected = Rc::new(RefCell::new(Vec::new()));

            let change_log = Rc::clone(&changes);
            let rejection_log = Rc::clone(&rejected);
            let options = options
                .on_change(move |value| change_log.borrow_mut().push(value.clone()))
                .on_disabled_day_error(move |day| rejection_log.borrow_mut().push(day));

            let registry = ListenerRegistry::new();
            let mut picker = DatePicker::with_today(options, test_today());
            picker.set_viewport(test_viewport());
            picker.record_input_bounds(test_input_bounds());
            picker.mount(&registry);

            Self {
                picker,
                registry,
                changes,
                rejected,
            }
        }

        /// Focus the input, which opens the popup
        pub fn open(&mut self) {
            self.picker.handle(PickerEvent::Focus);
            assert!(self.picker.is_open(), "picker should open on focus");
        }

        /// Every value passed to the change callback, oldest first
        pub fn changes(&self) -> Vec<DateValue> {
            self.changes.borrow().clone()
        }

        /// Every day passed to the disabled-day callback
        pub fn rejected(&self) -> Vec<NaiveDate> {
            self.rejected.borrow().clone()
        }
    }
}
