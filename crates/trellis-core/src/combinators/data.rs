// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scoped data-context injection.
//!
//! [`data_context`] pushes a frame of named values around its child parser;
//! frames nest and inner frames shadow outer ones. [`get_data`] reads a
//! value from the innermost frame that defines it, as a zero-consumption
//! parse — failing when the name is unset or holds a different type.

use std::any::Any;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Parses `inner` with the given named values in scope.
pub fn data_context<T: 'static, V: 'static>(
    inner: ParserRef<T, V>,
    values: Vec<(EcoString, Rc<dyn Any>)>,
) -> ParserRef<T, V> {
    struct DataContext<T, V> {
        meta: Meta,
        inner: ParserRef<T, V>,
        values: Vec<(EcoString, Rc<dyn Any>)>,
    }

    impl<T, V> Parser<T, V> for DataContext<T, V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
            state.push_data_frame(self.values.iter().cloned());
            let result = self.inner.parse(state);
            state.pop_data_frame();
            result
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            self.inner.syntax()
        }
    }

    Rc::new(DataContext {
        meta: Meta::new("data-context"),
        inner,
        values,
    })
}

/// Convenience for building a single data-context entry.
pub fn data_value<V: 'static>(name: impl Into<EcoString>, value: V) -> (EcoString, Rc<dyn Any>) {
    (name.into(), Rc::new(value))
}

/// Reads a named value from the data context, consuming no input.
pub fn get_data<T: 'static, V: Clone + 'static>(name: &str) -> ParserRef<T, V> {
    struct GetData<V> {
        meta: Meta,
        name: EcoString,
        _marker: std::marker::PhantomData<fn() -> V>,
    }

    impl<T, V: Clone + 'static> Parser<T, V> for GetData<V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
            match state.data_value(&self.name) {
                Some(value) => match value.downcast_ref::<V>() {
                    Some(value) => ParseResult::success(value.clone(), 0, self.meta.id()),
                    None => ParseResult::failure(
                        format!("data value '{}' has a different type", self.name),
                        self.meta.id(),
                    ),
                },
                None => ParseResult::failure(
                    format!("data value '{}' is not set", self.name),
                    self.meta.id(),
                ),
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Opaque(self.meta.name())
        }
    }

    let name = EcoString::from(name);
    Rc::new(GetData {
        meta: Meta::new(format!("data:{name}")),
        name,
        _marker: std::marker::PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::sequencing::combine;
    use crate::parser::TextParserExt;
    use crate::primitives::match_item;

    #[test]
    fn get_data_reads_injected_value() {
        let parser = data_context(get_data::<char, u32>("radix"), vec![data_value("radix", 16u32)]);
        let result = parser.parse_text("");
        assert_eq!(result.consumed(), 0);
        assert_eq!(result.value(), Some(16));
    }

    #[test]
    fn inner_frames_shadow_outer_frames() {
        let inner = data_context(
            get_data::<char, u32>("radix"),
            vec![data_value("radix", 2u32)],
        );
        let parser = data_context(inner, vec![data_value("radix", 16u32)]);
        assert_eq!(parser.parse_text("").value(), Some(2));
    }

    #[test]
    fn frames_pop_after_the_child_returns() {
        // Outside the context the value is gone: the bare get_data fails.
        let scoped = data_context(
            get_data::<char, u32>("radix"),
            vec![data_value("radix", 8u32)],
        );
        let unscoped = get_data::<char, u32>("radix");
        let parser = combine((scoped, unscoped), |(a, b)| (a, b));
        assert!(!parser.parse_text("").is_success());
    }

    #[test]
    fn wrong_type_is_a_parse_failure() {
        let parser = data_context(
            get_data::<char, String>("radix"),
            vec![data_value("radix", 10u32)],
        );
        assert!(!parser.parse_text("").is_success());
    }

    #[test]
    fn data_directed_parsing() {
        // The context selects which character class the child accepts.
        let item = combine(
            (
                get_data::<char, char>("expected"),
                match_item("item", |_: &char| true),
            ),
            |(expected, actual)| expected == actual,
        );
        let parser = data_context(item, vec![data_value("expected", 'q')]);
        assert_eq!(parser.parse_text("q").value(), Some(true));
        assert_eq!(parser.parse_text("z").value(), Some(false));
    }
}
