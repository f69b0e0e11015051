//! In-page scripts. Each runs through WebDriver `execute`, so `arguments`
//! holds the JSON arguments and the last expression must be a `return`.
//!
//! Page-side state lives on `window.__lookout`: `nodes` maps snapshot
//! handles to live elements, `epoch` counts body mutations.

/// Serializes the render tree (frames and open shadow roots included) to
/// the JSON read by `lookout_dom::snapshot::PageSnapshot`.
pub(crate) const SNAPSHOT: &str = r#"
const reg = window.__lookout || (window.__lookout = { nodes: [null], epoch: 0, observer: null });
reg.nodes = [null];
const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
const CONTAINER = 'agent-som-container';

function styleOf(el) {
  const cs = window.getComputedStyle(el);
  const z = parseInt(cs.zIndex, 10);
  return {
    display: cs.display,
    visibility: cs.visibility,
    position: cs.position,
    zIndex: Number.isNaN(z) ? null : z,
    cursor: cs.cursor,
    overflow: cs.overflow,
  };
}

function rectOf(el) {
  const r = el.getBoundingClientRect();
  return { x: r.x, y: r.y, width: r.width, height: r.height };
}

function walk(node) {
  const out = [];
  for (const child of node.childNodes) {
    if (child.nodeType === Node.TEXT_NODE) {
      if (child.data.length) out.push({ kind: 'text', text: child.data });
    } else if (child.nodeType === Node.ELEMENT_NODE) {
      if (SKIP.has(child.tagName) || child.id === CONTAINER) continue;
      out.push(element(child));
    }
  }
  return out;
}

function element(el) {
  reg.nodes.push(el);
  const e = {
    kind: 'element',
    handle: reg.nodes.length - 1,
    tag: el.tagName.toLowerCase(),
    attrs: Array.from(el.attributes, (a) => [a.name, a.value]),
    rect: rectOf(el),
    style: styleOf(el),
    children: walk(el),
  };
  if (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA' || el.tagName === 'SELECT') {
    e.value = String(el.value);
  }
  if (el.shadowRoot) e.shadow = walk(el.shadowRoot);
  if (el.tagName === 'IFRAME' || el.tagName === 'FRAME') {
    try {
      const doc = el.contentDocument;
      if (!doc) throw new Error('no content document');
      e.frame = { status: 'loaded', url: doc.URL, title: doc.title, children: walk(doc) };
    } catch (_) {
      e.frame = { status: 'blocked' };
    }
  }
  return e;
}

return JSON.stringify({
  url: location.href,
  title: document.title,
  viewport: { width: window.innerWidth, height: window.innerHeight, scrollX: window.scrollX, scrollY: window.scrollY },
  children: walk(document),
});
"#;

/// `arguments[0]`: marker list. Replaces any existing overlay.
pub(crate) const DRAW_MARKERS: &str = r#"
const old = document.getElementById('agent-som-container');
if (old) old.remove();
const container = document.createElement('div');
container.id = 'agent-som-container';
container.style.cssText = 'position:absolute;top:0;left:0;width:0;height:0;z-index:2147483647;pointer-events:none;';
for (const m of arguments[0]) {
  const outline = document.createElement('div');
  outline.style.cssText = `position:absolute;left:${m.outline.x}px;top:${m.outline.y}px;width:${m.outline.width}px;height:${m.outline.height}px;border:2px solid #ff2d55;box-sizing:border-box;`;
  const badge = document.createElement('div');
  badge.className = 'agent-som-marker';
  badge.dataset.somId = String(m.id);
  badge.textContent = String(m.id);
  badge.style.cssText = `position:absolute;left:${m.badge.x}px;top:${m.badge.y}px;width:${m.badge.width}px;height:${m.badge.height}px;background:#ff2d55;color:#fff;font:bold 12px/18px monospace;text-align:center;border-radius:3px;`;
  container.appendChild(outline);
  container.appendChild(badge);
}
(document.body || document.documentElement).appendChild(container);
return arguments[0].length;
"#;

pub(crate) const CLEAR_MARKERS: &str = r#"
const c = document.getElementById('agent-som-container');
if (c) { c.remove(); return true; }
return false;
"#;

/// `arguments[0]`: snapshot handles. Returns how many were still attached.
pub(crate) const REMOVE_NODES: &str = r#"
const reg = window.__lookout;
if (!reg) return 0;
let removed = 0;
for (const h of arguments[0]) {
  const el = reg.nodes[h];
  if (el && el.isConnected) { el.remove(); removed++; }
}
return removed;
"#;

pub(crate) const ENABLE_SCROLL: &str = r#"
document.documentElement.style.overflow = 'auto';
if (document.body) document.body.style.overflow = 'auto';
return true;
"#;

/// Counts child-list mutations under `body`, ignoring the marker overlay.
pub(crate) const INSTALL_MUTATION_PROBE: &str = r#"
const reg = window.__lookout || (window.__lookout = { nodes: [null], epoch: 0, observer: null });
if (!reg.observer && document.body) {
  reg.observer = new MutationObserver((records) => {
    for (const r of records) {
      const t = r.target;
      if (r.type === 'childList' && !(t.closest && t.closest('#agent-som-container')) && t.id !== 'agent-som-container') {
        reg.epoch++;
        return;
      }
    }
  });
  reg.observer.observe(document.body, { childList: true, subtree: true });
}
return reg.epoch;
"#;

/// The mutation counter, or `-1` when no probe is installed (for example
/// after a navigation replaced the window).
pub(crate) const MUTATION_EPOCH: &str = r#"
const reg = window.__lookout;
return reg && reg.observer ? reg.epoch : -1;
"#;

pub(crate) const READY_STATE: &str = "return document.readyState;";
