//! Macros for deriving optics from enum variants and struct fields.

/// Build a [`Prism`](crate::optics::Prism) onto a single-field tuple variant.
///
/// # Example
///
/// ```
/// use harvest::prism;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Input {
///     Counter(i32),
///     Reset,
/// }
///
/// let counter = prism!(Input::Counter);
///
/// assert_eq!(counter.try_get(&Input::Counter(3)), Some(3));
/// assert_eq!(counter.try_get(&Input::Reset), None);
/// assert_eq!(counter.inject(4), Input::Counter(4));
/// ```
#[macro_export]
macro_rules! prism {
    ($enum:ident :: $variant:ident) => {
        $crate::optics::Prism::new(
            |whole: &$enum| match whole {
                $enum::$variant(part) => ::std::option::Option::Some(part.clone()),
                #[allow(unreachable_patterns)]
                _ => ::std::option::Option::None,
            },
            $enum::$variant,
        )
    };
}

/// Build a [`Lens`](crate::optics::Lens) onto a named struct field.
///
/// # Example
///
/// ```
/// use harvest::lens;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Settings {
///     volume: u8,
///     muted: bool,
/// }
///
/// let volume = lens!(Settings, volume);
/// let settings = Settings { volume: 3, muted: false };
///
/// assert_eq!(volume.get(&settings), 3);
/// assert_eq!(volume.set(settings, 9), Settings { volume: 9, muted: false });
/// ```
#[macro_export]
macro_rules! lens {
    ($whole:ty, $field:ident) => {
        $crate::optics::Lens::new(
            |whole: &$whole| whole.$field.clone(),
            |mut whole: $whole, part| {
                whole.$field = part;
                whole
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::optics::{AffineTraversal, Prism};

    #[derive(Clone, Debug, PartialEq)]
    enum Screen {
        Counter(i64),
        Todo(Vec<String>),
        Intro,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct App {
        current: Option<Screen>,
        title: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Single {
        Only(u8),
    }

    #[test]
    fn prism_macro_matches_only_its_variant() {
        let todo = prism!(Screen::Todo);

        assert_eq!(
            todo.try_get(&Screen::Todo(vec!["a".into()])),
            Some(vec!["a".to_string()])
        );
        assert_eq!(todo.try_get(&Screen::Counter(1)), None);
        assert_eq!(todo.try_get(&Screen::Intro), None);
    }

    #[test]
    fn prism_macro_handles_single_variant_enums() {
        let only = prism!(Single::Only);
        assert_eq!(only.try_get(&Single::Only(1)), Some(1));
    }

    #[test]
    fn macros_compose_into_screen_focus() {
        let counter: AffineTraversal<App, i64> = lens!(App, current)
            .then_prism(Prism::some())
            .then_prism(prism!(Screen::Counter));

        let app = App {
            current: Some(Screen::Counter(1)),
            title: "t".to_string(),
        };
        let updated = counter.modify(app, |n| n + 1);
        assert_eq!(updated.current, Some(Screen::Counter(2)));
        assert_eq!(updated.title, "t");
    }
}
