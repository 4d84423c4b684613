use chrono::{DateTime, Datelike, NaiveDate, Utc};
use ramhorns::Template;

use crate::config::{Profile, Project, Skill};
use crate::error::Result;
use crate::post::BlogPost;
use crate::post_store::PostStats;
use crate::view::{parse_template, PostItem};

#[derive(ramhorns::Content)]
struct ViewProject<'a> {
    title: &'a str,
    description: &'a str,
    link: &'a str,
    has_link: bool,
    tech: Vec<ViewTech<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewTech<'a> {
    name: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewSkill<'a> {
    name: &'a str,
    level: u32,
}

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    name: &'a str,
    headline: &'a str,
    about: &'a str,
    email: &'a str,
    has_email: bool,
    projects: Vec<ViewProject<'a>>,
    skills: Vec<ViewSkill<'a>>,
    latest_posts: Vec<PostItem<'a>>,
    years_developing: i64,
    days_since_started: i64,
    post_count: i64,
}

/// Start dates the landing page counters are computed from.
#[derive(Copy, Clone, Debug)]
pub struct Activity {
    pub activity_start_year: i32,
    pub blog_start_date: NaiveDate,
}

impl Activity {
    pub fn years_developing(&self, now: DateTime<Utc>) -> i64 {
        (now.year() - self.activity_start_year).max(0) as i64
    }

    pub fn days_since_started(&self, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - self.blog_start_date).num_days().max(0)
    }
}

pub struct IndexRenderer<'a> {
    pub template: Template<'a>,
    pub excerpt_length: usize,
}

impl IndexRenderer<'_> {
    pub fn new(index_tpl_src: &str, excerpt_length: usize) -> Result<IndexRenderer> {
        let template = parse_template("index", index_tpl_src)?;

        Ok(IndexRenderer {
            template,
            excerpt_length,
        })
    }

    pub fn render(&self, profile: &Profile, activity: Activity, stats: PostStats,
                  latest_posts: &[BlogPost], now: DateTime<Utc>) -> String {
        self.template.render(&IndexPage {
            name: profile.name.as_str(),
            headline: profile.headline.as_str(),
            about: profile.about.as_str(),
            email: profile.email.as_deref().unwrap_or(""),
            has_email: profile.email.is_some(),
            projects: profile.projects.iter().map(view_project).collect(),
            skills: profile.skills.iter().map(view_skill).collect(),
            latest_posts: latest_posts.iter().map(|p| PostItem::from(p, self.excerpt_length)).collect(),
            years_developing: activity.years_developing(now),
            days_since_started: activity.days_since_started(now),
            post_count: stats.published_blogs as i64,
        })
    }
}

fn view_project(project: &Project) -> ViewProject<'_> {
    ViewProject {
        title: project.title.as_str(),
        description: project.description.as_str(),
        link: project.link.as_deref().unwrap_or(""),
        has_link: project.link.is_some(),
        tech: project.tech.iter().map(|t| ViewTech { name: t.as_str() }).collect(),
    }
}

fn view_skill(skill: &Skill) -> ViewSkill<'_> {
    ViewSkill {
        name: skill.name.as_str(),
        level: skill.level.min(100) as u32,
    }
}
