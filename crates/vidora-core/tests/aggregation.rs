mod common;

use common::Fixture;
use uuid::Uuid;
use vidora_core::aggregate::VideoListParams;
use vidora_core::aggregate::query::{JoinSet, QuerySpec};
use vidora_core::{CoreError, paginate};
use vidora_types::models::{Polarity, Target};

#[test]
fn test_search_ranks_matching_title_first() {
    let fx = Fixture::new();
    let owner = fx.user("owner");
    let plain = fx.video_with(owner, "Gardening basics", "", true, 0);
    let match_ = fx.video_with(owner, "My cat video", "", true, 120);

    let params = VideoListParams {
        search: Some("cat video".into()),
        ..Default::default()
    };
    let ids: Vec<Uuid> = fx
        .engine
        .aggregator()
        .video_list(&params, None)
        .unwrap()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, vec![match_, plain]);
}

#[test]
fn test_video_list_enrichment_and_anonymous_safety() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let bob = fx.user("bob");
    let v = fx.video(alice, "hello");
    fx.video_with(alice, "draft", "", false, 0);
    fx.engine
        .engagement()
        .set_reaction(bob, Target::video(v), Polarity::Like)
        .unwrap();

    let agg = fx.engine.aggregator();
    let as_bob: Vec<_> = agg.video_list(&VideoListParams::default(), Some(bob)).unwrap().collect();
    assert_eq!(as_bob.len(), 1);
    let view = &as_bob[0];
    let e = view.engagement;
    assert_eq!(e.total_likes, 1);
    assert!(e.is_liked);
    assert!(!view.is_owner);
    assert_eq!(view.owner.as_ref().unwrap().username, "alice");

    let anon: Vec<_> = agg.video_list(&VideoListParams::default(), None).unwrap().collect();
    let e = anon[0].engagement;
    assert_eq!(e.total_likes, 1);
    assert!(!e.is_liked && !e.is_disliked && !anon[0].is_owner);

    // The owner sees their own drafts on their channel
    let own = VideoListParams {
        owner: Some(alice),
        ..Default::default()
    };
    assert_eq!(agg.video_list(&own, Some(alice)).unwrap().count(), 2);
    assert_eq!(agg.video_list(&own, Some(bob)).unwrap().count(), 1);
}

#[test]
fn test_disabled_joins_keep_flags_false() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let v = fx.video(alice, "hello");
    fx.engine
        .engagement()
        .set_reaction(alice, Target::video(v), Polarity::Like)
        .unwrap();

    let spec = QuerySpec::videos().joins(JoinSet::none());
    let views: Vec<_> = fx.engine.aggregator().videos(&spec, Some(alice)).unwrap().collect();
    assert_eq!(views.len(), 1);
    assert!(views[0].owner.is_none());
    assert!(views[0].is_owner);
    assert_eq!(views[0].engagement.total_likes, 0);
    assert!(!views[0].engagement.is_liked && !views[0].engagement.is_disliked);

    let json = serde_json::to_value(&views[0]).unwrap();
    assert_eq!(json["is_liked"], false);
    assert_eq!(json["is_disliked"], false);
    assert_eq!(json["total_likes"], 0);
}

#[test]
fn test_video_list_rejects_unknown_sort() {
    let fx = Fixture::new();
    let params = VideoListParams {
        sort_by: Some("likes".into()),
        ..Default::default()
    };
    assert!(matches!(
        fx.engine.aggregator().video_list(&params, None),
        Err(CoreError::InvalidTarget(_))
    ));
}

#[test]
fn test_video_detail_visibility_and_channel() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let bob = fx.user("bob");
    let v = fx.video(alice, "public");
    let draft = fx.video_with(alice, "draft", "", false, 0);
    fx.engine.relationships().toggle_subscription(bob, alice).unwrap();

    let agg = fx.engine.aggregator();
    let detail = agg.video_detail(v, Some(bob)).unwrap();
    assert_eq!(detail.channel.subscribers_count, 1);
    assert!(detail.channel.is_subscribed);

    let anon = agg.video_detail(v, None).unwrap();
    assert!(!anon.channel.is_subscribed);
    assert!(!anon.video.is_owner);

    assert!(agg.video_detail(draft, Some(alice)).unwrap().video.is_owner);
    assert!(matches!(
        agg.video_detail(draft, Some(bob)),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        agg.video_detail(Uuid::new_v4(), None),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn test_comments_flag_video_owner_likes() {
    let fx = Fixture::new();
    let owner = fx.user("owner");
    let fan = fx.user("fan");
    let v = fx.video(owner, "v");
    let loved = fx.comment(v, fan, "great", 2);
    let ignored = fx.comment(v, fan, "meh", 1);
    fx.engine
        .engagement()
        .set_reaction(owner, Target::comment(loved), Polarity::Like)
        .unwrap();

    let comments: Vec<_> = fx
        .engine
        .aggregator()
        .comment_list(v, Some(fan))
        .unwrap()
        .collect();
    assert_eq!(
        comments.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![ignored, loved]
    );
    assert!(comments[1].is_liked_by_video_owner);
    assert!(!comments[0].is_liked_by_video_owner);
    assert!(comments.iter().all(|c| c.is_owner));

    assert!(matches!(
        fx.engine.aggregator().comment_list(Uuid::new_v4(), None),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn test_liked_videos_most_recent_first() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let bob = fx.user("bob");
    let first = fx.video(alice, "first");
    let second = fx.video(alice, "second");
    let disliked = fx.video(alice, "disliked");
    let engagement = fx.engine.engagement();

    engagement.set_reaction(bob, Target::video(first), Polarity::Like).unwrap();
    engagement.set_reaction(bob, Target::video(second), Polarity::Like).unwrap();
    engagement.set_reaction(bob, Target::video(disliked), Polarity::Dislike).unwrap();

    let liked: Vec<Uuid> = fx
        .engine
        .aggregator()
        .liked_videos(bob)
        .unwrap()
        .map(|v| v.id)
        .collect();
    assert_eq!(liked, vec![second, first]);
}

#[test]
fn test_tweet_views() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let bob = fx.user("bob");
    let carol = fx.user("carol");
    let a1 = fx.tweet(alice, "a1", 3);
    let b1 = fx.tweet(bob, "b1", 2);
    let c1 = fx.tweet(carol, "c1", 1);
    fx.engine.relationships().toggle_subscription(carol, alice).unwrap();
    fx.engine.relationships().toggle_subscription(carol, bob).unwrap();

    let agg = fx.engine.aggregator();
    let all: Vec<Uuid> = agg.all_tweets(None).unwrap().map(|t| t.id).collect();
    assert_eq!(all, vec![c1, b1, a1]);

    let feed: Vec<Uuid> = agg.tweet_feed(carol).unwrap().map(|t| t.id).collect();
    assert_eq!(feed, vec![b1, a1]);

    let lonely: Vec<_> = agg.tweet_feed(alice).unwrap().collect();
    assert!(lonely.is_empty());

    let mine: Vec<_> = agg.tweet_list(alice, Some(alice)).unwrap().collect();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_owner);
}

#[test]
fn test_pagination_over_enriched_views() {
    let fx = Fixture::new();
    let owner = fx.user("owner");
    for i in 0..23 {
        fx.video_with(owner, &format!("video {}", i), "", true, i);
    }

    let agg = fx.engine.aggregator();
    for limit in [1i64, 4, 10, 23, 50] {
        let req = fx.engine.page_request(Some(1), Some(limit));
        let first = paginate(agg.video_list(&VideoListParams::default(), None).unwrap(), req);
        assert_eq!(first.total_items, 23);
        assert_eq!(first.total_pages, 23u64.div_ceil(limit as u64));

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let req = fx.engine.page_request(Some(page as i64), Some(limit));
            let p = paginate(agg.video_list(&VideoListParams::default(), None).unwrap(), req);
            seen.extend(p.items.into_iter().map(|v| v.title));
        }
        assert_eq!(seen.len(), 23);
        assert_eq!(seen[0], "video 0");
        assert_eq!(seen[22], "video 22");
    }
}

#[test]
fn test_channel_profile_and_stats() {
    let fx = Fixture::new();
    let alice = fx.user("alice");
    let bob = fx.user("bob");
    let v1 = fx.video(alice, "one");
    fx.video(alice, "two");
    fx.engine.relationships().toggle_subscription(bob, alice).unwrap();
    fx.engine
        .engagement()
        .set_reaction(bob, Target::video(v1), Polarity::Like)
        .unwrap();

    let channels = fx.engine.channels();
    let profile = channels.channel_profile("@Alice", Some(bob)).unwrap();
    assert_eq!(profile.profile.id, alice);
    assert_eq!(profile.subscribers_count, 1);
    assert_eq!(profile.channels_subscribed_to_count, 0);
    assert!(profile.is_subscribed);
    assert!(!channels.channel_profile("alice", None).unwrap().is_subscribed);
    assert!(matches!(
        channels.channel_profile("nobody", None),
        Err(CoreError::NotFound(_))
    ));

    let stats = channels.channel_stats(alice).unwrap();
    assert_eq!(stats.total_videos, 2);
    assert_eq!(stats.total_subscribers, 1);
    assert_eq!(stats.total_likes, 1);
}
