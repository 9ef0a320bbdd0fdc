//! Menus served to tenants that have no subscription of their own.

use navguard_navigation::{NavigationNode, NavigationSection, NavigationTree};

/// Node that guards role management. Callers need `read` on it to list roles,
/// `add` to create, `update` to edit and `delete` to remove.
pub const ROLES_NODE_URL: &str = "/controls/roles";

fn leaf(url: &str, title: &str) -> NavigationNode {
    NavigationNode::new(url, title)
}

/// Billing and inventory menus plus the tenant controls footer.
pub fn builtin() -> NavigationTree {
    let main = vec![
        NavigationSection::new("Overview", vec![leaf("/dashboard", "Dashboard")]),
        NavigationSection::new(
            "Billing",
            vec![
                NavigationNode::new("/billing", "Billing").with_sub_items(vec![
                    leaf("/billing/invoices", "Invoices"),
                    leaf("/billing/quotations", "Quotations"),
                    leaf("/billing/payments", "Payments"),
                ]),
                leaf("/customers", "Customers"),
            ],
        ),
        NavigationSection::new(
            "Inventory",
            vec![
                NavigationNode::new("/inventory", "Inventory").with_sub_items(vec![
                    leaf("/inventory/products", "Products"),
                    leaf("/inventory/stock", "Stock"),
                    leaf("/inventory/purchases", "Purchases"),
                ]),
                leaf("/suppliers", "Suppliers"),
            ],
        ),
    ];

    let footer = vec![NavigationSection::new(
        "Controls",
        vec![
            NavigationNode::new("/controls", "Controls").with_sub_items(vec![
                leaf("/controls/branches", "Branches"),
                leaf(ROLES_NODE_URL, "Roles"),
                leaf("/controls/users", "Users"),
            ]),
            leaf("/settings", "Settings"),
        ],
    )];

    NavigationTree {
        main_navigation: main,
        footer_navigation: footer,
    }
}
