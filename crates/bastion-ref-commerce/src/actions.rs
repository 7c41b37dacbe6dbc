//! The six business actions of the support agent.
//!
//! Each action is declared once in the catalog with its action type and risk
//! level, then invoked through a `TrackedAction` so the interceptor decides
//! whether the mock operation runs at all.
//!
//! | action              | action type         | declared risk |
//! |---------------------|---------------------|---------------|
//! | `check_weather`     | `api:call`          | low           |
//! | `search_products`   | `api:call`          | low           |
//! | `get_user_profile`  | `database:read`     | medium        |
//! | `query_orders`      | `database:read`     | medium        |
//! | `send_notification` | `notification:send` | high          |
//! | `process_refund`    | `payment:process`   | high          |

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use bastion_contracts::{
    action::ActionSpec,
    agent::AgentId,
    decision::RiskTier,
    error::{BastionError, BastionResult},
    trust::TrustSnapshot,
};
use bastion_core::{ActionCatalog, AgentSession, TrackedAction};

use crate::mock_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CheckWeather,
    SearchProducts,
    GetUserProfile,
    QueryOrders,
    SendNotification,
    ProcessRefund,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::CheckWeather,
        ActionKind::SearchProducts,
        ActionKind::GetUserProfile,
        ActionKind::QueryOrders,
        ActionKind::SendNotification,
        ActionKind::ProcessRefund,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CheckWeather => "check_weather",
            ActionKind::SearchProducts => "search_products",
            ActionKind::GetUserProfile => "get_user_profile",
            ActionKind::QueryOrders => "query_orders",
            ActionKind::SendNotification => "send_notification",
            ActionKind::ProcessRefund => "process_refund",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::CheckWeather => "Check Weather",
            ActionKind::SearchProducts => "Search Products",
            ActionKind::GetUserProfile => "Get User Profile",
            ActionKind::QueryOrders => "Query Orders",
            ActionKind::SendNotification => "Send Notification",
            ActionKind::ProcessRefund => "Process Refund",
        }
    }

    pub fn action_type(&self) -> &'static str {
        match self {
            ActionKind::CheckWeather | ActionKind::SearchProducts => "api:call",
            ActionKind::GetUserProfile | ActionKind::QueryOrders => "database:read",
            ActionKind::SendNotification => "notification:send",
            ActionKind::ProcessRefund => "payment:process",
        }
    }

    pub fn declared_risk(&self) -> RiskTier {
        match self {
            ActionKind::CheckWeather | ActionKind::SearchProducts => RiskTier::Low,
            ActionKind::GetUserProfile | ActionKind::QueryOrders => RiskTier::Medium,
            ActionKind::SendNotification | ActionKind::ProcessRefund => RiskTier::High,
        }
    }

    pub fn spec(&self) -> ActionSpec {
        let spec = ActionSpec::new(self.name(), self.action_type())
            .risk_level(self.declared_risk())
            .description(self.label());
        match self {
            ActionKind::CheckWeather => spec.resource("weather"),
            ActionKind::SearchProducts => spec.resource("products"),
            _ => spec,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = BastionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BastionError::ConfigError {
                reason: format!("unknown action '{}'", s),
            })
    }
}

/// Every declared business action.
pub fn catalog() -> BastionResult<ActionCatalog> {
    let mut catalog = ActionCatalog::new();
    for kind in ActionKind::ALL {
        catalog.register(kind.spec())?;
    }
    Ok(catalog)
}

/// Typed access to the business actions for one agent.
pub struct CommerceAgent {
    session: AgentSession,
    check_weather: TrackedAction,
    search_products: TrackedAction,
    get_user_profile: TrackedAction,
    query_orders: TrackedAction,
    send_notification: TrackedAction,
    process_refund: TrackedAction,
}

impl CommerceAgent {
    pub fn new(session: AgentSession) -> BastionResult<Self> {
        Ok(Self {
            check_weather: session.track(ActionKind::CheckWeather.name())?,
            search_products: session.track(ActionKind::SearchProducts.name())?,
            get_user_profile: session.track(ActionKind::GetUserProfile.name())?,
            query_orders: session.track(ActionKind::QueryOrders.name())?,
            send_notification: session.track(ActionKind::SendNotification.name())?,
            process_refund: session.track(ActionKind::ProcessRefund.name())?,
            session,
        })
    }

    pub fn agent_id(&self) -> &AgentId {
        self.session.agent_id()
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }

    pub fn trust(&self) -> BastionResult<TrustSnapshot> {
        self.session.trust()
    }

    pub fn check_weather(&self, city: &str) -> BastionResult<Value> {
        self.check_weather.invoke(json!({ "city": city }), || {
            Ok::<_, Infallible>(mock_data::weather(city))
        })
    }

    pub fn search_products(&self, query: &str) -> BastionResult<Value> {
        self.search_products.invoke(json!({ "query": query }), || {
            Ok::<_, Infallible>(mock_data::product_search(query))
        })
    }

    pub fn get_user_profile(&self, user_id: &str) -> BastionResult<Value> {
        self.get_user_profile
            .invoke_on(format!("users/{}", user_id), json!({ "user_id": user_id }), || {
                Ok::<_, Infallible>(mock_data::user_profile(user_id))
            })
    }

    pub fn query_orders(&self, user_id: &str) -> BastionResult<Value> {
        self.query_orders
            .invoke_on(format!("users/{}/orders", user_id), json!({ "user_id": user_id }), || {
                Ok::<_, Infallible>(mock_data::order_summary(user_id))
            })
    }

    pub fn send_notification(&self, user_id: &str, message: &str) -> BastionResult<Value> {
        self.send_notification.invoke_on(
            format!("users/{}", user_id),
            json!({ "user_id": user_id, "message_length": message.len() }),
            || Ok::<_, Infallible>(mock_data::notification(user_id, message)),
        )
    }

    pub fn process_refund(&self, order_id: &str, amount: f64) -> BastionResult<Value> {
        self.process_refund.invoke_on(
            format!("orders/{}", order_id),
            json!({ "order_id": order_id, "amount": amount }),
            || mock_data::refund(order_id, amount),
        )
    }
}
