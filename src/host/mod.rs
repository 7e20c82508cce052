// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reference host
//!
//! `DocumentHost` owns a parsed HTML document and answers every gateway
//! operation against it. It backs the CLI, the tests and the benchmarks, and
//! can be exposed to an out-of-process runtime with [`crate::gateway::serve`].

mod fetch;
mod parser;
mod selector;
mod tree;

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::gateway::{Gateway, Handle, HostValue, Op};

pub use fetch::{Fetcher, DEFAULT_USER_AGENT};
#[cfg(feature = "http")]
pub use fetch::{HttpFetcher, HttpFetcherConfig};
pub use parser::{parse_fragment, parse_html};
pub use selector::Selector;
pub use tree::{NodeId, NodeKind, Tree};

/// Maps arena nodes to the integer handles shown to the runtime
#[derive(Debug, Default)]
struct HandleRegistry {
    by_node: HashMap<NodeId, i64>,
    nodes: Vec<NodeId>,
}

impl HandleRegistry {
    /// Handle for `node`, minting the next one on first exposure
    fn handle(&mut self, node: NodeId) -> Handle {
        let next = self.nodes.len() as i64 + 1;
        let handle = *self.by_node.entry(node).or_insert(next);
        if handle == next {
            self.nodes.push(node);
        }
        Handle::Int(handle)
    }

    fn node(&self, handle: &Handle) -> Result<NodeId> {
        let index = match handle {
            Handle::Int(n) if *n >= 1 => (*n - 1) as usize,
            _ => return Err(Error::other(format!("unknown handle {}", handle))),
        };
        self.nodes
            .get(index)
            .copied()
            .ok_or_else(|| Error::other(format!("unknown handle {}", handle)))
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Mutable host state, guarded by one lock
#[derive(Debug, Default)]
struct HostState {
    tree: Tree,
    handles: HandleRegistry,
    cookies: Vec<(String, String)>,
    messages: Vec<String>,
}

impl HostState {
    fn node(&self, args: &[HostValue], index: usize, op: Op) -> Result<NodeId> {
        let handle = args
            .get(index)
            .cloned()
            .ok_or_else(|| Error::other(format!("missing argument {}", index)))?
            .into_required_handle(op.as_str())?;
        self.handles.node(&handle)
    }

    fn handle_value(&mut self, node: Option<NodeId>) -> HostValue {
        HostValue::from(node.map(|n| self.handles.handle(n)))
    }

    fn handle_list(&mut self, nodes: Vec<NodeId>) -> HostValue {
        let handles: Vec<Handle> = nodes.into_iter().map(|n| self.handles.handle(n)).collect();
        HostValue::from(handles)
    }

    fn set_cookie(&mut self, value: &str) {
        let pair = value.split(';').next().unwrap_or_default().trim();
        if pair.is_empty() || pair == "=" {
            return;
        }
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (String::new(), pair.to_string()),
        };

        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    fn cookie_string(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| {
                if name.is_empty() {
                    value.clone()
                } else {
                    format!("{}={}", name, value)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn text_arg(args: &[HostValue], index: usize) -> Result<&str> {
    args.get(index)
        .and_then(HostValue::as_str)
        .ok_or_else(|| Error::other(format!("argument {} must be a string", index)))
}

fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// HTML document served over the gateway
///
/// Nodes are never freed: a handle stays valid for the host's lifetime, so
/// markup replaced by `innerHTML_set` or `outerHTML_set` remains in the arena.
/// Memory grows with the total number of nodes ever parsed or created.
pub struct DocumentHost {
    state: Mutex<HostState>,
    base_url: Option<Url>,
    fetcher: Option<Box<dyn Fetcher>>,
}

impl DocumentHost {
    /// Parse `html` into a new host
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self::from_tree(parse_html(html)?))
    }

    /// Serve an already built tree
    pub fn from_tree(tree: Tree) -> Self {
        Self {
            state: Mutex::new(HostState {
                tree,
                ..Default::default()
            }),
            base_url: None,
            fetcher: None,
        }
    }

    /// Set the URL request targets are resolved against
    pub fn with_url(mut self, url: &str) -> Result<Self> {
        self.base_url = Some(Url::parse(url)?);
        Ok(self)
    }

    /// Set the fetcher executing `XMLHttpRequest_send`
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Serialized document
    pub fn html(&self) -> String {
        let state = self.state.lock();
        state.tree.outer_html(state.tree.document())
    }

    /// Messages received through `log`, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.state.lock().messages.clone()
    }

    /// Current cookie string
    pub fn cookie(&self) -> String {
        self.state.lock().cookie_string()
    }

    /// Number of handles minted so far
    pub fn handle_count(&self) -> usize {
        self.state.lock().handles.len()
    }

    /// Change an attribute from the host side, e.g. when the user types
    pub fn set_attribute(&self, handle: &Handle, name: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let node = state.handles.node(handle)?;
        state.tree.set_attribute(node, name, value)
    }

    fn execute(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        if op == Op::XmlHttpRequestSend {
            return self.send_request(args);
        }

        let mut state = self.state.lock();
        let state = &mut *state;

        match op {
            Op::Log => {
                let message = match args.first() {
                    Some(HostValue::Str(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                info!(target: "hostdom::console", "{}", message);
                state.messages.push(message);
                Ok(HostValue::Null)
            }
            Op::GetAttribute => {
                let node = state.node(args, 0, op)?;
                let name = text_arg(args, 1)?;
                Ok(HostValue::from(state.tree.attribute(node, name)))
            }
            Op::ToString => {
                let node = state.node(args, 0, op)?;
                Ok(HostValue::from(state.tree.describe(node)))
            }
            Op::AppendChild => {
                let parent = state.node(args, 0, op)?;
                let child = state.node(args, 1, op)?;
                state.tree.append(parent, child)?;
                Ok(HostValue::Null)
            }
            Op::InsertBefore => {
                let reference = state.node(args, 0, op)?;
                let new = state.node(args, 1, op)?;
                state.tree.insert_before(reference, new)?;
                Ok(HostValue::Null)
            }
            Op::RemoveChild => {
                let parent = state.node(args, 0, op)?;
                let child = state.node(args, 1, op)?;
                let removed = state.tree.remove_child(parent, child).then_some(child);
                Ok(state.handle_value(removed))
            }
            Op::InnerHtmlGet => {
                let node = state.node(args, 0, op)?;
                Ok(HostValue::from(state.tree.inner_html(node)))
            }
            Op::InnerHtmlSet => {
                let node = state.node(args, 0, op)?;
                let markup = text_arg(args, 1)?;
                if !state.tree.is_element(node) {
                    return Err(Error::other("innerHTML can only be set on elements"));
                }
                let nodes = parse_fragment(&mut state.tree, markup)?;
                state.tree.replace_children(node, &nodes)?;
                Ok(HostValue::Null)
            }
            Op::OuterHtmlGet => {
                let node = state.node(args, 0, op)?;
                Ok(HostValue::from(state.tree.outer_html(node)))
            }
            Op::OuterHtmlSet => {
                let node = state.node(args, 0, op)?;
                let markup = text_arg(args, 1)?;
                if state.tree.parent(node).is_none() {
                    return Err(Error::other("cannot set outerHTML of a detached node"));
                }
                let nodes = parse_fragment(&mut state.tree, markup)?;
                state.tree.replace_with(node, &nodes)?;
                Ok(HostValue::Null)
            }
            Op::ChildrenGet => {
                let node = state.node(args, 0, op)?;
                let children = state.tree.element_children(node);
                Ok(state.handle_list(children))
            }
            Op::ParentNodeGet => {
                let node = state.node(args, 0, op)?;
                let document = state.tree.document();
                let parent = state.tree.parent(node).filter(|&p| p != document);
                Ok(state.handle_value(parent))
            }
            Op::IdGet => {
                let node = state.node(args, 0, op)?;
                Ok(HostValue::from(
                    state.tree.attribute(node, "id").unwrap_or_default(),
                ))
            }
            Op::IdSet => {
                let node = state.node(args, 0, op)?;
                let id = text_arg(args, 1)?;
                state.tree.set_attribute(node, "id", id)?;
                Ok(HostValue::Null)
            }
            Op::QuerySelector => {
                let selector = Selector::parse(text_arg(args, 0)?)?;
                let found = selector.select_first(&state.tree, state.tree.document());
                Ok(state.handle_value(found))
            }
            Op::QuerySelectorAll => {
                let selector = Selector::parse(text_arg(args, 0)?)?;
                let found = selector.select_all(&state.tree, state.tree.document());
                Ok(state.handle_list(found))
            }
            Op::CreateElement => {
                let tag = text_arg(args, 0)?;
                if !is_valid_tag_name(tag) {
                    return Err(Error::other(format!("invalid tag name '{}'", tag)));
                }
                let node = state.tree.create_element(tag);
                Ok(state.handle_value(Some(node)))
            }
            Op::CookieGet => Ok(HostValue::from(state.cookie_string())),
            Op::CookieSet => {
                state.set_cookie(text_arg(args, 0)?);
                Ok(HostValue::Null)
            }
            Op::XmlHttpRequestSend => Err(Error::other("requests are not served from the document")),
        }
    }

    fn send_request(&self, args: &[HostValue]) -> Result<HostValue> {
        let method = text_arg(args, 0)?;
        let target = text_arg(args, 1)?;
        let body = args
            .get(2)
            .cloned()
            .unwrap_or_default()
            .into_text(Op::XmlHttpRequestSend.as_str())?;

        let url = match &self.base_url {
            Some(base) => base.join(target)?,
            None => Url::parse(target)?,
        };
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| Error::other("network access is disabled"))?;

        debug!(method, %url, "executing request");
        fetcher.fetch(method, &url, body.as_deref()).map(HostValue::from)
    }
}

impl Gateway for DocumentHost {
    fn call(&self, op: Op, args: &[HostValue]) -> Result<HostValue> {
        self.execute(op, args).map_err(|e| e.into_host(op.as_str()))
    }
}

impl std::fmt::Debug for DocumentHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHost")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("handles", &self.handle_count())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::dom::Node;
    use crate::runtime::{RuntimeContext, ScriptValue};

    const GUESTBOOK: &str = r#"<!DOCTYPE html>
<html>
<head><title>Guest book</title></head>
<body>
<form action="/add" method="post">
  <p><input name="guest" value=""></p>
  <p><button>Sign the book!</button></p>
</form>
<strong></strong>
<p id="entry-1">First!</p>
</body>
</html>"#;

    fn guestbook() -> (Arc<DocumentHost>, RuntimeContext) {
        let host = Arc::new(DocumentHost::parse(GUESTBOOK).unwrap());
        let ctx = RuntimeContext::with_defaults(host.clone());
        (host, ctx)
    }

    #[test]
    fn test_handles_are_stable() {
        let (host, ctx) = guestbook();
        let doc = ctx.document();

        let form = doc.query_selector("form").unwrap().unwrap();
        let again = doc.query_selector("form").unwrap().unwrap();
        assert_eq!(form, again);
        assert_eq!(form.handle(), &Handle::Int(1));
        assert_eq!(host.handle_count(), 1);

        let all = doc.query_selector_all("form, input").unwrap();
        assert_eq!(all[0], form);
        assert_eq!(all[1].handle(), &Handle::Int(2));
    }

    #[test]
    fn test_unknown_handle_is_host_error() {
        let (_, ctx) = guestbook();
        for handle in [Handle::Int(99), Handle::Int(0), Handle::from("form")] {
            let err = ctx.node(handle).to_host_string().unwrap_err();
            assert!(err.is_host());
            assert_eq!(err.op(), Some("toString"));
        }
    }

    #[test]
    fn test_attributes_and_to_string() {
        let (_, ctx) = guestbook();
        let form = ctx.document().query_selector("form").unwrap().unwrap();

        assert_eq!(form.get_attribute("action").unwrap(), Some("/add".into()));
        assert_eq!(form.get_attribute("target").unwrap(), None);
        assert_eq!(
            form.to_host_string().unwrap(),
            r#"<form action="/add" method="post">"#
        );
        assert_eq!(ctx.document().query_selector("#entry-1").unwrap().unwrap().id().unwrap(), "entry-1");
    }

    #[test]
    fn test_children_and_parent() {
        let (_, ctx) = guestbook();
        let doc = ctx.document();
        let form = doc.query_selector("form").unwrap().unwrap();

        let rows = form.children().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].inner_html().unwrap(), r#"<input name="guest" value>"#);

        let body = form.parent_node().unwrap().unwrap();
        assert_eq!(body.to_host_string().unwrap(), "<body>");
        let html = body.parent_node().unwrap().unwrap();
        assert_eq!(html.to_host_string().unwrap(), "<html>");
        assert_eq!(html.parent_node().unwrap(), None);

        let detached = doc.create_element("div").unwrap();
        assert_eq!(detached.parent_node().unwrap(), None);
        assert!(detached.children().unwrap().is_empty());
    }

    #[test]
    fn test_create_append_insert_remove() {
        let (host, ctx) = guestbook();
        let doc = ctx.document();
        let strong = doc.query_selector("strong").unwrap().unwrap();
        let entry = doc.query_selector("#entry-1").unwrap().unwrap();
        let body = entry.parent_node().unwrap().unwrap();

        let second = doc.create_element("p").unwrap();
        second.set_id("entry-2").unwrap();
        second.set_inner_html("Second").unwrap();
        body.append_child(&second).unwrap();
        let form = doc.query_selector("form").unwrap().unwrap();
        assert_eq!(
            body.children().unwrap(),
            vec![form.clone(), strong.clone(), entry.clone(), second.clone()]
        );
        assert!(host.html().contains(r#"<p id="entry-2">Second</p>"#));

        // Moves the node rather than copying it
        entry.insert_before(&second).unwrap();
        assert_eq!(
            body.children().unwrap(),
            vec![form, strong.clone(), second.clone(), entry.clone()]
        );

        assert_eq!(strong.remove_child(&second).unwrap(), None);
        assert_eq!(body.remove_child(&second).unwrap(), Some(second.clone()));
        assert!(!host.html().contains("entry-2"));
        assert_eq!(second.parent_node().unwrap(), None);

        // Inserting before a detached node changes nothing
        second.insert_before(&strong).unwrap();
        assert!(strong.parent_node().unwrap().is_some());

        let err = doc.create_element("not a tag").unwrap_err();
        assert!(err.is_host());
        assert_eq!(err.op(), Some("createElement"));
    }

    #[test]
    fn test_append_into_own_subtree_fails() {
        let (_, ctx) = guestbook();
        let form = ctx.document().query_selector("form").unwrap().unwrap();
        let input = ctx.document().query_selector("input").unwrap().unwrap();
        assert!(input.append_child(&form).unwrap_err().is_host());
    }

    #[test]
    fn test_inner_and_outer_html() {
        let (host, ctx) = guestbook();
        let strong = ctx.document().query_selector("strong").unwrap().unwrap();

        strong.set_inner_html("Text <em>too</em> long!").unwrap();
        assert_eq!(strong.inner_html().unwrap(), "Text <em>too</em> long!");
        assert_eq!(strong.children().unwrap().len(), 1);

        strong.set_inner_html(ScriptValue::Array(vec![1.into(), 2.into()])).unwrap();
        assert_eq!(strong.inner_html().unwrap(), "1,2");

        strong.set_outer_html("<b>bold</b><i>italic</i>").unwrap();
        assert!(host.html().contains("<b>bold</b><i>italic</i>"));
        assert!(!host.html().contains("<strong>"));
        assert_eq!(strong.parent_node().unwrap(), None);

        let err = strong.set_outer_html("<u>again</u>").unwrap_err();
        assert!(err.is_host());
        assert_eq!(err.op(), Some("outerHTML_set"));
    }

    #[test]
    fn test_query_errors() {
        let (_, ctx) = guestbook();
        assert_eq!(ctx.document().query_selector("table").unwrap(), None);
        assert!(ctx.document().query_selector_all("video").unwrap().is_empty());

        let err = ctx.document().query_selector_all("p:hover").unwrap_err();
        assert!(err.is_host());
        assert_eq!(err.op(), Some("querySelectorAll"));
        assert!(err.to_string().contains("p:hover"));
    }

    #[test]
    fn test_cookies() {
        let (host, ctx) = guestbook();
        let doc = ctx.document();

        assert_eq!(doc.cookie().unwrap(), "");
        doc.set_cookie("session=abc; Path=/; HttpOnly").unwrap();
        doc.set_cookie("theme=dark").unwrap();
        doc.set_cookie("session=xyz").unwrap();
        assert_eq!(doc.cookie().unwrap(), "session=xyz; theme=dark");
        assert_eq!(host.cookie(), "session=xyz; theme=dark");
    }

    #[test]
    fn test_replaced_nodes_keep_their_handles() {
        let (_host, ctx) = guestbook();
        let doc = ctx.document();
        let form = doc.query_selector("form").unwrap().unwrap();
        let input = doc.query_selector("input").unwrap().unwrap();

        let body = doc.query_selector("body").unwrap().unwrap();
        body.set_inner_html("<p>cleared</p>").unwrap();

        assert!(doc.query_selector("form").unwrap().is_none());
        assert!(form.parent_node().unwrap().is_none());
        assert_eq!(form.to_host_string().unwrap(), r#"<form action="/add" method="post">"#);
        assert_eq!(input.get_attribute("name").unwrap().as_deref(), Some("guest"));
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let (host, ctx) = guestbook();
        let doc = ctx.document();

        doc.set_cookie("a=1").unwrap();
        doc.set_cookie("").unwrap();
        doc.set_cookie("  ; Path=/").unwrap();
        doc.set_cookie("=").unwrap();
        assert_eq!(doc.cookie().unwrap(), "a=1");
        assert_eq!(host.cookie(), "a=1");
    }

    #[test]
    fn test_console_reaches_host() {
        let (host, ctx) = guestbook();
        ctx.console()
            .log(&["submitted".into(), ScriptValue::Boolean(false)])
            .unwrap();
        assert_eq!(host.messages(), vec!["submitted", "false"]);
    }

    #[test]
    fn test_request_through_fetcher() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let host = DocumentHost::parse(GUESTBOOK)
            .unwrap()
            .with_url("http://guestbook.test/comments/")
            .unwrap()
            .with_fetcher(move |method: &str, url: &Url, body: Option<&str>| -> Result<String> {
                log.lock().push(format!("{} {} {:?}", method, url, body));
                Ok("saved".to_string())
            });
        let ctx = RuntimeContext::with_defaults(host);

        let mut xhr = ctx.xml_http_request();
        xhr.open("POST", "/add", false).unwrap();
        xhr.send(Some("guest=hi")).unwrap();
        assert_eq!(xhr.response_text(), Some("saved"));

        xhr.open("GET", "count", false).unwrap();
        xhr.send(None).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                r#"POST http://guestbook.test/add Some("guest=hi")"#,
                "GET http://guestbook.test/comments/count None",
            ]
        );
    }

    #[test]
    fn test_request_without_fetcher() {
        let (_, ctx) = guestbook();
        let mut xhr = ctx.xml_http_request();
        xhr.open("GET", "http://guestbook.test/", false).unwrap();
        let err = xhr.send(None).unwrap_err();
        assert!(err.is_host());
        assert_eq!(err.op(), Some("XMLHttpRequest_send"));

        xhr.open("GET", "relative/path", false).unwrap();
        assert!(xhr.send(None).unwrap_err().is_host());
    }

    /// Length check on the guest input that blocks submission of long entries
    fn install_length_check(ctx: &RuntimeContext) {
        let doc = ctx.document();
        let strong = doc.query_selector("strong").unwrap().unwrap();
        let allow_submit = Arc::new(Mutex::new(true));

        for input in doc.query_selector_all("input").unwrap() {
            let strong = strong.clone();
            let allow = allow_submit.clone();
            input.add_event_listener("keydown", move |node: &Node, _| {
                let value = node.get_attribute("value")?.unwrap_or_default();
                let ok = value.chars().count() <= 100;
                *allow.lock() = ok;
                if !ok {
                    strong.set_inner_html("Text too long!")?;
                } else if !strong.inner_html()?.is_empty() {
                    strong.set_inner_html("")?;
                }
                Ok(())
            });
        }

        if let Some(form) = doc.query_selector("form").unwrap() {
            form.add_event_listener("submit", move |_, event| {
                if !*allow_submit.lock() {
                    event.prevent_default();
                }
                Ok(())
            });
        }
    }

    #[test]
    fn test_guestbook_length_check() {
        let (host, ctx) = guestbook();
        install_length_check(&ctx);

        let input = ctx.document().query_selector("input").unwrap().unwrap();
        let form = ctx.document().query_selector("form").unwrap().unwrap();
        let strong = ctx.document().query_selector("strong").unwrap().unwrap();

        host.set_attribute(input.handle(), "value", &"x".repeat(101)).unwrap();
        assert!(ctx.dispatch(input.handle().clone(), "keydown").unwrap());
        assert_eq!(strong.inner_html().unwrap(), "Text too long!");
        assert!(!ctx.dispatch(form.handle().clone(), "submit").unwrap());

        host.set_attribute(input.handle(), "value", "short").unwrap();
        ctx.dispatch(input.handle().clone(), "keydown").unwrap();
        assert_eq!(strong.inner_html().unwrap(), "");
        assert!(ctx.dispatch(form.handle().clone(), "submit").unwrap());
    }

    #[test]
    fn test_submit_bubbles_from_button() {
        let (_, ctx) = guestbook();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let body = ctx.document().query_selector("body").unwrap().unwrap();
        let log = seen.clone();
        body.add_event_listener("click", move |node, _| {
            log.lock().push(node.to_host_string()?);
            Ok(())
        });

        let button = ctx.document().query_selector("button").unwrap().unwrap();
        assert!(button.dispatch_event(&mut crate::dom::Event::new("click")).unwrap());
        assert_eq!(*seen.lock(), vec!["<body>"]);
    }
}
