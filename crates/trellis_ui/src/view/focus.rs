//! Directional focus search and tree path queries.

use std::cmp::Reverse;
use std::rc::Rc;

use tracing::trace;
use trellis_core::{Direction, Vec2};

use super::{same_view, ViewChild, ViewHandle};

/// A focusable view found by [`focus_search`], and how to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusSearchResult {
    /// The view to focus, positioned relative to the search root.
    pub target: ViewChild,
    /// Ancestors of the target from the search root down, each positioned relative to
    /// the element before it. The target itself is not included.
    pub path: Vec<ViewChild>,
}

impl FocusSearchResult {
    /// Creates a result.
    #[must_use]
    pub fn new(target: ViewChild, path: Vec<ViewChild>) -> Self {
        Self { target, path }
    }

    /// Moves the result into a parent's coordinate space.
    ///
    /// Only the target and the first path element change; the rest of the path is
    /// already relative to its own parent.
    #[must_use]
    pub fn offset(mut self, distance: Vec2) -> Self {
        self.target.position += distance;
        if let Some(first) = self.path.first_mut() {
            first.position += distance;
        }
        self
    }

    /// Prepends `parent` to the path after applying its content offset.
    #[must_use]
    pub fn as_child(self, parent: ViewHandle, content_offset: Vec2) -> Self {
        let mut result = self.offset(content_offset);
        result.path.insert(0, ViewChild::new(parent, Vec2::ZERO));
        result
    }
}

/// Finds the next focusable view reached by moving from `position` toward `direction`.
///
/// `position` is relative to `view`'s outer top-left corner. Returns `None` when the
/// view is hidden or nothing focusable lies that way.
#[must_use]
pub fn focus_search(
    view: &ViewHandle,
    position: Vec2,
    direction: Direction,
) -> Option<FocusSearchResult> {
    let node = view.borrow();
    if !node.state().is_visible() {
        return None;
    }
    let offset = node.content_offset();
    trace!(
        "'{}' starting focus search at {:?} toward {:?}",
        node.state().name(),
        position - offset,
        direction
    );

    if let Some(found) = node.find_focusable_descendant(position - offset, direction) {
        trace!("'{}' found focusable descendant", node.state().name());
        return Some(found.as_child(Rc::clone(view), offset));
    }

    let outer = node.outer_size();
    let entering = match direction {
        Direction::East => position.x < 0.0,
        Direction::West => position.x >= outer.x,
        Direction::South => position.y < 0.0,
        Direction::North => position.y >= outer.y,
    };
    if node.state().is_focusable() && entering {
        trace!("'{}' has no focusable descendants but matched itself", node.state().name());
        let target = ViewChild::new(Rc::clone(view), Vec2::ZERO);
        return Some(FocusSearchResult::new(target, Vec::new()));
    }
    None
}

/// Focus search over overlapping children, for containers without a linear order.
///
/// A child that already contains `position` is searched first, then the rest by
/// z-index. Children lying behind the direction of travel are skipped.
#[must_use]
pub fn search_children(
    children: &[ViewChild],
    position: Vec2,
    direction: Direction,
) -> Option<FocusSearchResult> {
    let mut ordered: Vec<(bool, i32, &ViewChild)> = children
        .iter()
        .map(|child| (child.contains_point(position), child.view.borrow().state().z_index(), child))
        .collect();
    ordered.sort_by_key(|(inside, z_index, _)| (Reverse(*inside), Reverse(*z_index)));
    ordered
        .into_iter()
        .filter(|(_, _, child)| child.is_in_direction(position, direction))
        .find_map(|(_, _, child)| child.focus_search(position, direction))
}

/// The view that should receive focus when `view` is first shown.
///
/// Returns `view` itself if focusable, else the first descendant that is, positioned
/// relative to `view`.
#[must_use]
pub fn default_focus_child(view: &ViewHandle) -> Option<ViewChild> {
    let children = {
        let node = view.borrow();
        if !node.state().is_visible() {
            return None;
        }
        if node.state().is_focusable() {
            return Some(ViewChild::new(Rc::clone(view), Vec2::ZERO));
        }
        node.children()
    };
    children
        .iter()
        .find_map(|child| {
            default_focus_child(&child.view).map(|found| found.offset(child.position))
        })
}

/// Views under `position`, from `root` down to the deepest hit.
///
/// Each element is positioned relative to the one before it; `root` is at the origin.
/// Empty if `root` does not contain the point.
#[must_use]
pub fn path_to_position(root: &ViewHandle, position: Vec2) -> Vec<ViewChild> {
    if !root.borrow().contains_point(position) {
        return Vec::new();
    }
    let mut path = vec![ViewChild::new(Rc::clone(root), Vec2::ZERO)];
    let mut current = Rc::clone(root);
    let mut local = position;
    loop {
        let next = current.borrow().children_at(local).into_iter().next();
        let Some(child) = next else {
            break;
        };
        local -= child.position;
        current = Rc::clone(&child.view);
        path.push(child);
    }
    path
}

/// Path from `root` to `target`, inclusive, or `None` if `target` is not in the tree.
#[must_use]
pub fn path_to_view(root: &ViewHandle, target: &ViewHandle) -> Option<Vec<ViewChild>> {
    let mut path = vec![ViewChild::new(Rc::clone(root), Vec2::ZERO)];
    find_path(root, target, &mut path).then_some(path)
}

fn find_path(view: &ViewHandle, target: &ViewHandle, path: &mut Vec<ViewChild>) -> bool {
    if same_view(view, target) {
        return true;
    }
    let children = view.borrow().children();
    for child in children {
        let next = Rc::clone(&child.view);
        path.push(child);
        if find_path(&next, target, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{handle, View};
    use crate::widget::{Lane, Spacer};
    use trellis_core::{Edges, LayoutParameters, Orientation};

    fn button(width: f32) -> ViewHandle {
        let mut spacer = Spacer::new(LayoutParameters::fixed_size(width, 10.0));
        spacer.state_mut().set_focusable(true);
        handle(spacer)
    }

    #[test]
    fn test_offset_only_touches_target_and_first_path_element() {
        let a = button(10.0);
        let b = button(10.0);
        let target = button(10.0);
        let result = FocusSearchResult::new(
            ViewChild::new(target, Vec2::new(1.0, 1.0)),
            vec![ViewChild::new(a, Vec2::new(2.0, 2.0)), ViewChild::new(b, Vec2::new(3.0, 3.0))],
        )
        .offset(Vec2::new(10.0, 0.0));

        assert_eq!(result.target.position, Vec2::new(11.0, 1.0));
        assert_eq!(result.path[0].position, Vec2::new(12.0, 2.0));
        assert_eq!(result.path[1].position, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_leaf_matches_itself_only_when_entering() {
        let leaf = button(20.0);
        leaf.borrow_mut().measure(Vec2::new(100.0, 100.0));

        let found = focus_search(&leaf, Vec2::new(-5.0, 5.0), Direction::East).unwrap();
        assert!(same_view(&found.target.view, &leaf));
        assert!(found.path.is_empty());

        assert!(focus_search(&leaf, Vec2::new(5.0, 5.0), Direction::East).is_none());
        assert!(focus_search(&leaf, Vec2::new(-5.0, 5.0), Direction::West).is_none());
    }

    #[test]
    fn test_three_level_path() {
        let leaf = button(20.0);
        let mut inner = Lane::new(Orientation::Horizontal);
        inner.state_mut().set_padding(Edges::all(3));
        inner.add_child(Rc::clone(&leaf));
        let inner = handle(inner);

        let mut root = Lane::new(Orientation::Horizontal);
        root.state_mut().set_margin(Edges::new(5, 0, 0, 0));
        root.add_child(handle(Spacer::new(LayoutParameters::fixed_size(40.0, 10.0))));
        root.add_child(Rc::clone(&inner));
        let root = handle(root);
        root.borrow_mut().measure(Vec2::new(500.0, 500.0));

        let found = focus_search(&root, Vec2::new(0.0, 5.0), Direction::East).unwrap();
        assert!(same_view(&found.target.view, &leaf));
        assert_eq!(found.path.len(), 2);
        assert!(same_view(&found.path[0].view, &root));
        assert_eq!(found.path[0].position, Vec2::ZERO);
        assert!(same_view(&found.path[1].view, &inner));
        // Root margin plus the spacer in front.
        assert_eq!(found.path[1].position, Vec2::new(45.0, 0.0));
        // Inner padding on top of that.
        assert_eq!(found.target.position, Vec2::new(48.0, 3.0));
    }

    #[test]
    fn test_paths_and_default_focus() {
        let leaf = button(20.0);
        let mut lane = Lane::new(Orientation::Vertical);
        lane.add_child(handle(Spacer::new(LayoutParameters::fixed_size(20.0, 15.0))));
        lane.add_child(Rc::clone(&leaf));
        let lane = handle(lane);
        lane.borrow_mut().measure(Vec2::new(100.0, 100.0));

        let path = path_to_view(&lane, &leaf).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[1].position, Vec2::new(0.0, 15.0));

        let stranger = button(5.0);
        assert!(path_to_view(&lane, &stranger).is_none());

        let hit = path_to_position(&lane, Vec2::new(5.0, 20.0));
        assert_eq!(hit.len(), 2);
        assert!(same_view(&hit[1].view, &leaf));
        assert!(path_to_position(&lane, Vec2::new(500.0, 0.0)).is_empty());

        let focus = default_focus_child(&lane).unwrap();
        assert!(same_view(&focus.view, &leaf));
        assert_eq!(focus.position, Vec2::new(0.0, 15.0));
    }
}
