//! Field extraction strategies.
//!
//! Portal markup changes often, so each field is read through a [`Cascade`]:
//! an ordered list of strategies tried until one yields a non-empty value.

use scraper::{ElementRef, Selector};

/// Compile CSS selectors, skipping any that fail to parse.
pub fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// Text content with whitespace runs collapsed to single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Non-empty trimmed lines of an element's text, in document order.
pub fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Closest ancestor (excluding the element itself) matching `selector`.
pub fn closest_ancestor<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}

/// One way of reading a field from a listing element.
pub trait FieldStrategy {
    fn extract(&self, element: ElementRef<'_>) -> Option<String>;
}

/// Text of the first descendant matching a selector.
pub struct SelectorText {
    selector: Selector,
}

impl SelectorText {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }
}

impl FieldStrategy for SelectorText {
    fn extract(&self, element: ElementRef<'_>) -> Option<String> {
        element
            .select(&self.selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }
}

/// Attribute of the first descendant matching a selector.
pub struct SelectorAttr {
    selector: Selector,
    attr: &'static str,
}

impl SelectorAttr {
    pub fn new(selector: Selector, attr: &'static str) -> Self {
        Self { selector, attr }
    }
}

impl FieldStrategy for SelectorAttr {
    fn extract(&self, element: ElementRef<'_>) -> Option<String> {
        element
            .select(&self.selector)
            .filter_map(|el| el.value().attr(self.attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(String::from)
    }
}

/// `href` of the first matching link that does not contain `reject`.
pub struct LinkHref {
    selector: Selector,
    reject: &'static str,
}

impl LinkHref {
    pub fn new(selector: Selector, reject: &'static str) -> Self {
        Self { selector, reject }
    }
}

impl FieldStrategy for LinkHref {
    fn extract(&self, element: ElementRef<'_>) -> Option<String> {
        // The card itself may be the link
        std::iter::once(element)
            .filter(|el| self.selector.matches(el))
            .chain(element.select(&self.selector))
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty() && !href.contains(self.reject))
            .map(String::from)
    }
}

/// Text found inside the closest ancestor container of the element.
pub struct AncestorText {
    ancestor: Selector,
    inner: Selector,
}

impl AncestorText {
    pub fn new(ancestor: Selector, inner: Selector) -> Self {
        Self { ancestor, inner }
    }
}

impl FieldStrategy for AncestorText {
    fn extract(&self, element: ElementRef<'_>) -> Option<String> {
        closest_ancestor(element, &self.ancestor)?
            .select(&self.inner)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }
}

/// An ordered list of strategies with early exit.
#[derive(Default)]
pub struct Cascade {
    strategies: Vec<Box<dyn FieldStrategy>>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`SelectorText`] strategy per selector, in order.
    pub fn texts(selectors: &[&str]) -> Self {
        compile(selectors)
            .into_iter()
            .fold(Self::new(), |cascade, selector| cascade.then(SelectorText::new(selector)))
    }

    /// One [`LinkHref`] strategy per selector, in order.
    pub fn links(selectors: &[&str], reject: &'static str) -> Self {
        compile(selectors)
            .into_iter()
            .fold(Self::new(), |cascade, selector| cascade.then(LinkHref::new(selector, reject)))
    }

    /// Append a strategy.
    pub fn then(mut self, strategy: impl FieldStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// First non-empty value.
    pub fn resolve(&self, element: ElementRef<'_>) -> Option<String> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.extract(element))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
