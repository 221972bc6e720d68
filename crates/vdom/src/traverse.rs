use crate::node::{Route, VNode};

/// Recomputes routes for the whole tree, treating `root` as the tree root.
pub fn assign_routes(root: &mut VNode) {
    assign_routes_from(root, Route::root());
}

/// Recomputes routes for a subtree whose root lives at `base`.
pub fn assign_routes_from(node: &mut VNode, base: Route) {
    fn walk(node: &mut VNode, route: Route) {
        if let Some(children) = node.children_mut() {
            for (index, child) in children.iter_mut().enumerate() {
                walk(child, route.child(index));
            }
        }
        node.set_route(route);
    }

    walk(node, base);
}

pub fn find_node_by_route<'a>(root: &'a VNode, route: &Route) -> Option<&'a VNode> {
    let mut current = root;
    for &index in route.as_slice() {
        current = current.children()?.get(index)?;
    }
    Some(current)
}

pub fn find_node_by_route_mut<'a>(root: &'a mut VNode, route: &Route) -> Option<&'a mut VNode> {
    let mut current = root;
    for &index in route.as_slice() {
        current = current.children_mut()?.get_mut(index)?;
    }
    Some(current)
}

pub fn count_nodes(node: &VNode) -> usize {
    1 + node
        .children()
        .map(|children| children.iter().map(count_nodes).sum::<usize>())
        .unwrap_or(0)
}
