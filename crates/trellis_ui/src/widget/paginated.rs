use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;
use trellis_core::{Alignment, Direction, LayoutParameters, Orientation, Vec2};

use super::{Frame, Image, Lane};
use crate::render::SpriteBatch;
use crate::sprite::Sprite;
use crate::view::{
    draw_children, search_children, FocusSearchResult, View, ViewChild, ViewHandle, ViewState,
    Visibility,
};

type PageHandler = Rc<dyn Fn(usize)>;

struct Pages {
    pages: Vec<ViewHandle>,
    index: usize,
    frame: Rc<RefCell<Frame>>,
    previous: Rc<RefCell<Image>>,
    next: Rc<RefCell<Image>>,
    on_change: Vec<PageHandler>,
}

impl Pages {
    /// Shows the current page and hides arrows that lead nowhere.
    fn sync(&self) {
        let page = self.pages.get(self.index).map(Rc::clone);
        self.frame.borrow_mut().set_content(page);
        let arrow_visibility =
            |shown: bool| if shown { Visibility::Visible } else { Visibility::Hidden };
        self.previous
            .borrow_mut()
            .state_mut()
            .set_visibility(arrow_visibility(self.index > 0));
        self.next
            .borrow_mut()
            .state_mut()
            .set_visibility(arrow_visibility(self.index + 1 < self.pages.len()));
    }
}

/// Moves to the page chosen by `target`, clamped to the page range.
///
/// Change observers run after the page state is released.
fn change_page(pages: &RefCell<Pages>, target: impl FnOnce(&Pages) -> Option<usize>) -> bool {
    let handlers = {
        let mut state = pages.borrow_mut();
        let Some(requested) = target(&state) else {
            return false;
        };
        let index = requested.min(state.pages.len().saturating_sub(1));
        if index == state.index {
            return false;
        }
        state.index = index;
        state.sync();
        debug!(page = index, count = state.pages.len(), "page changed");
        state.on_change.clone()
    };
    let index = pages.borrow().index;
    for handler in &handlers {
        handler(index);
    }
    true
}

/// Shows one page at a time inside a [`Frame`], between previous and next arrows.
///
/// ```text
/// horizontal:   ◀ ┌──────────┐ ▶        vertical:      ▲
///                 │  page i  │                    ┌────────┐
///                 └──────────┘                    │ page i │
///                                                 └────────┘
///                                                      ▼
/// ```
///
/// Arrows are hidden (but keep their space) on the first and last page.
pub struct PaginatedMenu {
    state: ViewState,
    root: Rc<RefCell<Lane>>,
    pages: Rc<RefCell<Pages>>,
}

impl PaginatedMenu {
    /// Creates a menu with arrows drawn from the given sprites.
    #[must_use]
    pub fn new(orientation: Orientation, previous_arrow: Sprite, next_arrow: Sprite) -> Self {
        let frame = Rc::new(RefCell::new(Frame::new()));
        let previous = Rc::new(RefCell::new(Image::new(Some(previous_arrow))));
        let next = Rc::new(RefCell::new(Image::new(Some(next_arrow))));
        previous.borrow_mut().state_mut().set_name("PreviousPage");
        next.borrow_mut().state_mut().set_name("NextPage");

        let children: Vec<ViewHandle> = vec![previous.clone(), frame.clone(), next.clone()];
        let root = Lane::new(orientation)
            .with_children(children)
            .with_alignment(Alignment::Middle, Alignment::Middle);

        let pages = Rc::new(RefCell::new(Pages {
            pages: Vec::new(),
            index: 0,
            frame,
            previous: Rc::clone(&previous),
            next: Rc::clone(&next),
            on_change: Vec::new(),
        }));
        pages.borrow().sync();

        let weak = Rc::downgrade(&pages);
        previous.borrow_mut().state_mut().handlers_mut().left_click.add(move |event| {
            if let Some(pages) = Weak::upgrade(&weak) {
                change_page(&pages, |state| state.index.checked_sub(1));
                event.handled = true;
            }
        });
        let weak = Rc::downgrade(&pages);
        next.borrow_mut().state_mut().handlers_mut().left_click.add(move |event| {
            if let Some(pages) = Weak::upgrade(&weak) {
                change_page(&pages, |state| Some(state.index + 1));
                event.handled = true;
            }
        });

        Self {
            state: ViewState::new("PaginatedMenu"),
            root: Rc::new(RefCell::new(root)),
            pages,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Sets the pages and shows the first.
    #[must_use]
    pub fn with_pages(self, pages: Vec<ViewHandle>) -> Self {
        self.set_pages(pages);
        self
    }

    /// Replaces every page and goes back to the first.
    pub fn set_pages(&self, pages: Vec<ViewHandle>) {
        let mut state = self.pages.borrow_mut();
        state.pages = pages;
        state.index = 0;
        state.sync();
    }

    /// The frame around the current page, for borders and backgrounds.
    #[must_use]
    pub fn frame(&self) -> Rc<RefCell<Frame>> {
        Rc::clone(&self.pages.borrow().frame)
    }

    /// Index of the page shown.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.pages.borrow().index
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.borrow().pages.len()
    }

    /// Shows page `index`, clamped to the last page. Returns `true` if the page changed.
    pub fn set_page(&self, index: usize) -> bool {
        change_page(&self.pages, |_| Some(index))
    }

    /// Shows the next page. Returns `false` on the last page.
    pub fn next_page(&self) -> bool {
        change_page(&self.pages, |state| Some(state.index + 1))
    }

    /// Shows the previous page. Returns `false` on the first page.
    pub fn previous_page(&self) -> bool {
        change_page(&self.pages, |state| state.index.checked_sub(1))
    }

    /// Runs `handler` with the new index whenever the page changes.
    pub fn on_page_change(&self, handler: impl Fn(usize) + 'static) {
        self.pages.borrow_mut().on_change.push(Rc::new(handler));
    }

    fn root_child(&self) -> ViewChild {
        let root: ViewHandle = self.root.clone();
        ViewChild::new(root, Vec2::ZERO)
    }
}

impl fmt::Debug for PaginatedMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedMenu")
            .field("state", &self.state)
            .field("page_index", &self.page_index())
            .field("page_count", &self.page_count())
            .finish_non_exhaustive()
    }
}

impl View for PaginatedMenu {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let mut root = self.root.borrow_mut();
        root.measure(layout.limits(available));
        layout.resolve(available, root.outer_size())
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        draw_children(&[self.root_child()], batch);
    }

    fn local_children(&self) -> Vec<ViewChild> {
        vec![self.root_child()]
    }

    fn is_content_dirty(&self) -> bool {
        self.root.borrow().is_dirty()
    }

    fn find_focusable_descendant(
        &self,
        position: Vec2,
        direction: Direction,
    ) -> Option<FocusSearchResult> {
        search_children(&self.local_children(), position, direction)
    }
}
