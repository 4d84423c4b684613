#[cfg(test)]
pub const END_TO_END_MD: &str = "# Intro\n\nHello **world**.\n\n## Details\n\n- item one\n- item two";

#[cfg(test)]
pub const POST_DATA_MD: &str = "# What I learned after 20+ years of software development

How to be a great software engineer?

Someone asked me this question today and I didn't have an answer. After thinking for a while, I came up with a list of what I try to do myself.

<!-- more -->

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
Some day you will find that there are many developers much better than you. **The earlier you find that, the better.**

## Technical

- Read the [docs](https://doc.rust-lang.org/book/) first
- Write tests, *always*

```rust
fn main() {
    println!(\"**not bold**\");
}
```

> There is no silver bullet.

#### Too deep for the outline
";

#[cfg(test)]
pub const POSTS_JSON: &str = r###"[
  {
    "id": "a63bd715-a3fe-4788-b0e1-2a3153778544",
    "title": "What I learned after 20+ years of software development",
    "content": "# What I learned\n\nHow to be a great software engineer?\n\n<!-- more -->\n\n## Non technical\n\nBe humble.",
    "published": true,
    "tags": ["career", "engineering"],
    "createdAt": "2022-04-02T12:05:00Z",
    "updatedAt": "2022-04-03T08:00:00Z"
  },
  {
    "id": "0f5f8a36-2a38-4c57-a4b0-5f1d3c9e7b21",
    "title": "Draft: Rust error handling",
    "content": "## Why thiserror\n\nIt keeps error enums small.",
    "published": false,
    "createdAt": "2023-01-10T09:30:00Z",
    "updatedAt": "2023-01-10T09:30:00Z"
  }
]"###;
